/// The authenticated identity of the current visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
}

impl Session {
    pub fn customer(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::customer(user_id, email)
        }
    }
}

/// Where the caller should send the visitor next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Menu,
    Cart,
    Checkout,
    Profile,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::SignIn => "/auth",
            Route::Menu => "/menu",
            Route::Cart => "/cart",
            Route::Checkout => "/checkout",
            Route::Profile => "/profile",
        }
    }
}
