/// Separator between messages in the raw input
pub const MESSAGE_SEPARATOR: char = '§';

/// Ordered list of messages. Positions in this list are the indices reported
/// by cluster queries, so empty messages are kept in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList {
    messages: Vec<String>,
}

impl MessageList {
    /// Split `raw` on [`MESSAGE_SEPARATOR`], keeping empty segments.
    ///
    /// ```
    /// use msgcluster_rs::MessageList;
    ///
    /// let messages = MessageList::parse("hello§§world");
    /// assert_eq!(messages.as_slice(), ["hello", "", "world"]);
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self {
            messages: raw.split(MESSAGE_SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.messages.get(index).map(String::as_str)
    }

    /// Index of the first message exactly equal to `target`
    pub fn position(&self, target: &str) -> Option<usize> {
        self.messages.iter().position(|m| m == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.messages
    }
}

impl From<Vec<String>> for MessageList {
    fn from(messages: Vec<String>) -> Self {
        Self { messages }
    }
}

impl<'a> FromIterator<&'a str> for MessageList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().map(str::to_string).collect(),
        }
    }
}
