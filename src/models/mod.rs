pub mod category;
pub mod deletion;
pub mod scan_result;
pub mod size;
