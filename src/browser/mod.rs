pub mod connection;
pub mod headless;

pub use connection::{connect_to_browser, new_blank_page};
pub use headless::launch_browser;
