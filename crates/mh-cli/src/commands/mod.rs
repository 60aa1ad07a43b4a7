pub mod audit;
pub mod dispatch;
pub mod history;
pub mod house;
pub mod mark;
pub mod post;
pub mod shared;
pub mod week;
