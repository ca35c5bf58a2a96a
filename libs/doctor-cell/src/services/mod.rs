pub mod approval;
pub mod doctor;

pub use approval::ApprovalService;
pub use doctor::DoctorService;
