use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
        }
    }

    /// HTML forms only speak GET and POST.
    pub fn form_method(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post | Method::Put | Method::Delete => "post",
        }
    }

    /// Value of the leading `_method` field Rocket uses to reinterpret a POST.
    pub fn override_value(self) -> Option<&'static str> {
        match self {
            Method::Put | Method::Delete => Some(self.as_str()),
            Method::Get | Method::Post => None,
        }
    }
}

/// A request a page asks the server to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_body(Method::Get, url, Vec::new())
    }

    pub fn post(url: impl Into<String>, body: Vec<(String, String)>) -> Self {
        Self::with_body(Method::Post, url, body)
    }

    pub fn put(url: impl Into<String>, body: Vec<(String, String)>) -> Self {
        Self::with_body(Method::Put, url, body)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::with_body(Method::Delete, url, Vec::new())
    }

    fn with_body(method: Method, url: impl Into<String>, body: Vec<(String, String)>) -> Self {
        Self {
            method,
            url: url.into(),
            body,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.body
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn form_action(&self) -> FormAction {
        FormAction {
            action: self.url.clone(),
            method: self.method.form_method(),
            override_method: self.method.override_value(),
        }
    }
}

/// The attributes a `<form>` needs to carry a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormAction {
    pub action: String,
    pub method: &'static str,
    pub override_method: Option<&'static str>,
}

/// URL convention shared by every resource page:
/// `/unit/{unit}/{resource}` for the collection and `/unit/{unit}/{resource}/{id}`
/// for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoute {
    unit_id: i64,
    resource: &'static str,
    return_page: Option<u64>,
}

impl ResourceRoute {
    pub fn new(unit_id: i64, resource: &'static str) -> Self {
        Self {
            unit_id,
            resource,
            return_page: None,
        }
    }

    /// Mutations issued from this route send the user back to `page` afterwards.
    pub fn with_page(mut self, page: Option<u64>) -> Self {
        self.return_page = page.filter(|page| *page > 1);
        self
    }

    pub fn unit_id(&self) -> i64 {
        self.unit_id
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn return_page(&self) -> Option<u64> {
        self.return_page
    }

    pub fn collection(&self) -> String {
        format!("/unit/{}/{}", self.unit_id, self.resource)
    }

    pub fn member(&self, id: i64) -> String {
        format!("{}/{id}", self.collection())
    }

    pub fn page(&self, page: u64) -> String {
        format!("{}?page={page}", self.collection())
    }

    /// Where the list view should land after a mutation or a closed modal.
    pub fn list(&self) -> String {
        match self.return_page {
            Some(page) => self.page(page),
            None => self.collection(),
        }
    }

    pub fn create_link(&self) -> String {
        self.with_query(self.collection(), "modal=create")
    }

    pub fn edit_link(&self, id: i64) -> String {
        self.with_query(self.collection(), &format!("edit={id}"))
    }

    pub fn create_url(&self) -> String {
        self.mutation_url(self.collection())
    }

    pub fn update_url(&self, id: i64) -> String {
        self.mutation_url(self.member(id))
    }

    pub fn delete_url(&self, id: i64) -> String {
        self.mutation_url(self.member(id))
    }

    fn mutation_url(&self, base: String) -> String {
        match self.return_page {
            Some(page) => format!("{base}?page={page}"),
            None => base,
        }
    }

    fn with_query(&self, base: String, query: &str) -> String {
        match self.return_page {
            Some(page) => format!("{base}?page={page}&{query}"),
            None => format!("{base}?{query}"),
        }
    }
}
