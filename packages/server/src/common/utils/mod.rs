mod member_id;

pub use member_id::sanitize_member_id;
