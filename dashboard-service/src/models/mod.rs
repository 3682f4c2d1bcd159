//! Domain models for dashboard-service.

mod customer;
mod invoice;
mod revenue;
mod user;

pub use customer::{Customer, CustomerField, CustomerTableRow, FormattedCustomerRow};
pub use invoice::{
    CardData, CreateInvoice, Invoice, InvoiceRow, InvoiceStatus, LatestInvoice, LatestInvoiceRow,
    UpdateInvoice,
};
pub use revenue::Revenue;
pub use user::User;
