use crate::schema::{FieldSpec, ImageRef};
use crate::slide::ContentRating;

pub const DEFAULT_LOGO_URL: &str =
    "https://brandyhq.com/wp-content/uploads/2024/12/Hyundai-Logo.jpg";

/// Header fields shared by every built-in layout, followed by `body`.
pub(super) fn with_header(section_default: &str, body: Vec<FieldSpec>) -> Vec<FieldSpec> {
    let mut fields = header_fields(section_default);
    fields.extend(body);
    fields
}

/// `slideNumber`, `sectionTitle`, `contentRating` and `companyLogo`.
pub fn header_fields(section_default: &str) -> Vec<FieldSpec> {
    vec![
        FieldSpec::number("slideNumber", 1.0..)
            .default(1.0)
            .describe("Slide sequence number"),
        FieldSpec::text("sectionTitle", 2..=50)
            .default(section_default)
            .describe("Section or slide title displayed in the header"),
        FieldSpec::one_of("contentRating", ContentRating::TAGS)
            .default("restricted")
            .describe("Content classification rating"),
        FieldSpec::image("companyLogo")
            .default(ImageRef::new(DEFAULT_LOGO_URL, "Company logo"))
            .describe("Brand or company logo"),
    ]
}
