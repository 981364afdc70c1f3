pub mod time;

/// A 21 character url-safe id, used for node ids.
pub fn longid() -> String {
    nanoid::nanoid!()
}
