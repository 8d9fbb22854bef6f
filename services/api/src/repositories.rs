//! Repositories for database operations

pub mod department;
pub mod document;
pub mod employee;

// Re-export for convenience
pub use department::DepartmentRepository;
pub use document::DocumentRepository;
pub use employee::EmployeeRepository;
