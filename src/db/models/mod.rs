//! Database models

pub mod order;
pub mod restaurant;
pub mod topup;
pub mod user;

pub use order::{CartItem, Order, OrderCreate, OrderItem, OrderWithItems};
pub use restaurant::{Restaurant, RestaurantCreate, StaffAdd, StaffEntry};
pub use topup::{TopUp, TopUpCreate, TopUpKeyType};
pub use user::{User, UserCreate, UserProfile};
