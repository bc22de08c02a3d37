use uuid::Uuid;

const ID_LEN: usize = 12;

/// Short random identifier for tabs, bookmarks and history entries
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}
