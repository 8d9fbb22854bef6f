//! Shared HR models

pub mod department;
pub mod employee;
pub mod role;
pub mod user;

// Re-export for convenience
pub use department::Department;
pub use employee::{
    Address, BankDetails, Certification, Education, EmergencyContact, Employee, EmployeeField,
    EmployeeSnapshot, EmployeeStatus, EmployeeUpdate, NewEmployee,
};
pub use role::Role;
pub use user::UserAccount;
