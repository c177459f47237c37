use std::fmt;

/// Raw result of a single successful GET against the course page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(Reason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The course code does not occur anywhere in the page text.
    CodeNotFound,
    /// A negative indicator phrase was found near the course code.
    Indicator(&'static str),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::CodeNotFound => f.write_str("course code not found"),
            Reason::Indicator(phrase) => write!(f, "indicator `{phrase}` near course code"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn course_available(course_code: &str) -> Self {
        Self {
            title: format!("{course_code} is available!"),
            body: format!(
                "A seat opened up in {course_code}. Go register before it fills up again!"
            ),
        }
    }

    pub fn sms_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub sms_sent: bool,
    pub desktop_sent: bool,
}

impl NotificationOutcome {
    pub fn delivered(&self) -> bool {
        self.sms_sent || self.desktop_sent
    }
}
