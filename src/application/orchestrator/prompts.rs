//! 图片提示词

use crate::domain::project::{DocumentFormat, GenerationConfig, Project};

fn format_label(format: DocumentFormat) -> &'static str {
    match format {
        DocumentFormat::Document => "book cover",
        DocumentFormat::SlideDeck => "presentation title slide background",
    }
}

/// 封面提示词，由项目标题、插图风格和输出格式决定
pub fn cover_prompt(project: &Project) -> String {
    let config = project.config();
    format!(
        "A {} for \"{}\". Style: {}. Striking central composition, no text, no lettering.",
        format_label(config.format),
        project.title(),
        config.style.prompt_label(),
    )
}

/// 章节插图提示词，由章节标题、插图风格和输出格式决定
pub fn section_prompt(section_title: &str, config: &GenerationConfig) -> String {
    let framing = match config.format {
        DocumentFormat::Document => "an editorial illustration for a book chapter",
        DocumentFormat::SlideDeck => "a wide visual for a presentation slide",
    };
    format!(
        "Create {} titled \"{}\". Style: {}. No text, no lettering.",
        framing,
        section_title,
        config.style.prompt_label(),
    )
}
