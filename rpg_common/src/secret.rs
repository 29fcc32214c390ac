use std::fmt;

/// Wrapper for credential material (the gateway webhook secret, the JWT signing key) that must never end up
/// in logs. Both `Debug` and `Display` print a fixed mask; the only way to get at the value is an explicit
/// [`Secret::reveal`] call, which makes accidental leaks greppable.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    inner: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Hands out the wrapped value. Call sites should do this as late as possible and never store the result.
    pub fn reveal(&self) -> &T {
        &self.inner
    }
}

impl<T: Clone + Default> From<T> for Secret<T> {
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}

impl<T: Clone + Default> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::Secret;

    #[test]
    fn formatting_never_exposes_the_value() {
        let secret = Secret::new("whsec_hunter2".to_string());
        assert_eq!(format!("{secret}"), "****");
        assert_eq!(format!("{secret:?}"), "****");
        assert_eq!(format!("{secret:#?}"), "****");
    }

    #[test]
    fn reveal_returns_the_wrapped_value() {
        let secret: Secret<String> = "whsec_hunter2".to_string().into();
        assert_eq!(secret.reveal(), "whsec_hunter2");
    }

    #[test]
    fn default_is_empty() {
        let secret = Secret::<String>::default();
        assert_eq!(secret.reveal(), "");
    }
}
