mod article_list;
mod filter_bar;
mod popup;
mod status_bar;

pub use article_list::{age_label, truncate_to_width, ArticleListWidget};
pub use filter_bar::FilterBarWidget;
pub use popup::PopupWidget;
pub use status_bar::StatusBarWidget;
