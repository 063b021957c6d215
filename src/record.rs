//! Test records: a name paired with a body that may be disabled.

/// Whether a registered test will run.
pub enum TestBody<B> {
    Enabled(B),
    /// Registered through `nit`; reported but never executed.
    Disabled,
}

impl<B> TestBody<B> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, TestBody::Enabled(_))
    }
}

/// A declared test case. Immutable once registered.
pub struct TestRecord<B> {
    name: String,
    body: TestBody<B>,
}

impl<B> TestRecord<B> {
    pub fn enabled(name: impl Into<String>, body: B) -> Self {
        Self {
            name: name.into(),
            body: TestBody::Enabled(body),
        }
    }

    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: TestBody::Disabled,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.body.is_enabled()
    }

    pub fn into_parts(self) -> (String, TestBody<B>) {
        (self.name, self.body)
    }
}

impl<B> std::fmt::Debug for TestRecord<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRecord")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
