// Provider constants: names, routes, store keys and user fields.

/// Strategy name registered with the host.
pub const PROVIDER_ID: &str = "vkontakte";

/// Display name used in associations and the admin menu.
pub const PROVIDER_NAME: &str = "Vkontakte";

/// Font icon class.
pub const PROVIDER_ICON: &str = "vk fa-vk";

/// Login redirect route.
pub const AUTH_PATH: &str = "/auth/vkontakte";

/// OAuth callback route.
pub const CALLBACK_PATH: &str = "/auth/vkontakte/callback";

/// OAuth scope requested from the provider.
pub const SCOPE: &str = "email";

/// Profile fields requested from the provider.
pub const PROFILE_FIELDS: [&str; 4] = ["id", "emails", "name", "displayName"];

/// Public profile URL prefix; the provider id is appended.
pub const PROFILE_URL_PREFIX: &str = "https://vk.com/id";

/// Admin menu route (relative to the admin root).
pub const ADMIN_MENU_ROUTE: &str = "/plugins/sso-vkontakte";

/// Admin page route.
pub const ADMIN_PAGE_PATH: &str = "/admin/plugins/sso-vkontakte";

/// Admin JSON route.
pub const ADMIN_API_PATH: &str = "/api/admin/plugins/sso-vkontakte";

/// Object-store map from provider id to uid.
pub const LINKAGE_MAP: &str = "vkontakteid:uid";

/// User record fields written by the plugin.
pub mod fields {
    pub const PROVIDER_UID: &str = "vkontakteid";
    pub const ACCESS_TOKEN: &str = "vkaccesstoken";
    pub const REFRESH_TOKEN: &str = "vkrefreshtoken";
    pub const EMAIL_CONFIRMED: &str = "email:confirmed";
    pub const PICTURE: &str = "picture";
    pub const UPLOADED_PICTURE: &str = "uploadedpicture";
}
