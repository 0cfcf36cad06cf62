pub mod analytic_data;
pub mod productivity;
pub mod settings;
