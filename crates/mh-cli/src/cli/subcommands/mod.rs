mod history;
mod house;
mod mark;
mod post;
mod week;

pub use history::HistoryCommands;
pub use house::HouseCommands;
pub use mark::MarkCommands;
pub use post::PostCommands;
pub use week::WeekCommands;
