pub mod complaintdb;
pub mod db;
pub mod fixtures;

pub use complaintdb::{ComplaintExt, ComplaintFilter};
pub use db::DBClient;
