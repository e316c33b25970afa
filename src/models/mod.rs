mod company;
mod client;
mod invoice;
mod invoice_item;

pub use company::Company;
pub use client::Client;
pub use invoice::{Invoice, InvoiceListRow};
pub use invoice_item::InvoiceItem;
