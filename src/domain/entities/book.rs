/// The free ebook currently on promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeBook {
    pub name: String,
    pub summary: String,
    /// Promotion end as epoch seconds, taken from the page countdown.
    pub expires: i64,
}
