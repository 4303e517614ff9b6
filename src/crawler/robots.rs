mod robots_txt_source;

pub use robots_txt_source::{RobotsTxtRules, RobotsTxtSource};
