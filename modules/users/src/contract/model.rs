/// Pure user model for inter-module communication (no serde/utoipa)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub email: String,
}

/// The four caller-supplied fields of a user.
///
/// Used both for creation and for the full-overwrite update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub email: String,
}

impl User {
    /// Overwrite every mutable field with `data`; the identifier is kept.
    pub fn overwrite(&mut self, data: NewUser) {
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.age = data.age;
        self.email = data.email;
    }
}
