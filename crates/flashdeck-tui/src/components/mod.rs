pub mod card_list;
pub mod dashboard;
