pub mod brands;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod product_images;
pub mod product_tags;
pub mod products;
pub mod profiles;
pub mod reviews;
pub mod tags;
pub mod users;
pub mod wishlists;

pub use brands::Entity as Brands;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use product_tags::Entity as ProductTags;
pub use products::Entity as Products;
pub use profiles::Entity as Profiles;
pub use reviews::Entity as Reviews;
pub use tags::Entity as Tags;
pub use users::Entity as Users;
pub use wishlists::Entity as Wishlists;
