//! 도메인 서비스.

pub mod employee;
pub mod payroll;

pub use employee::EmployeeService;
pub use payroll::PayrollService;
