pub mod category;
pub mod customer;
pub mod order;
pub mod order_detail;
pub mod product;

pub use category::Entity as Category;
pub use customer::Entity as Customer;
pub use order::Entity as Order;
pub use order_detail::Entity as OrderDetail;
pub use product::Entity as Product;
