pub mod audit_logs;
pub mod cart_items;
pub mod categories;
pub mod cloud_uploads;
pub mod messages;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod profiles;
pub mod sessions;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use cloud_uploads::Entity as CloudUploads;
pub use messages::Entity as Messages;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use profiles::Entity as Profiles;
pub use sessions::Entity as Sessions;
pub use users::Entity as Users;
