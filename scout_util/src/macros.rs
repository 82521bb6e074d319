#[macro_export]
macro_rules! opt {
    (, $default:ident) => {
        $default
    };
    ($optional:expr, $default:tt) => {
        $optional
    };
}

#[macro_export]
macro_rules! param_key {
    ($name:ident) => {
        stringify!($name)
    };
    ($name:literal) => {
        $name
    };
}

#[macro_export]
macro_rules! params_internal {
    ($vec:ident, required, $key:expr, $val:expr) => {
        $vec.push(($key.to_string(), $val.to_string()));
    };
    ($vec:ident, optional, $key:expr, $val:expr) => {
        if let Some(ref v) = $val {
            $vec.push(($key.to_string(), v.to_string()));
        }
    };
}

/// The macros are used to more conveniently build query params for API endpoints.
/// Inspired by https://nullderef.com/blog/web-api-client/
/// Keys are either identifiers or string literals (for names like `user.fields`).
/// Literal keys always need an explicit value. Example:
/// ```
/// use scout_util::build_params;
///
/// let max_results = 1000;
/// let pagination_token: Option<&str> = None;
/// let params = build_params! {
///     required max_results,
///     required "user.fields" => "public_metrics",
///     optional pagination_token,
/// };
/// assert_eq!(params.len(), 2);
/// assert_eq!(params[1], ("user.fields".to_string(), "public_metrics".to_string()));
/// ```
#[macro_export]
macro_rules! build_params {
    (
        $(
            $kind:ident $name:tt $( => $val:expr )?
        ),+ $(,)?
    ) => {
        {
            let mut params: Vec<(String, String)> = Vec::new();
            $(
                $crate::params_internal!(
                    params,
                    $kind,
                    $crate::param_key!($name),
                    $crate::opt!($( $val )?, $name)
                );
            )+
            params
        }
    };
}
