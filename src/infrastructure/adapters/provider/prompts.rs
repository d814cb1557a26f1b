//! 大纲与章节正文提示词

use crate::application::ports::SectionTextRequest;
use crate::domain::project::{DocumentFormat, GenerationConfig};

fn audience_line(config: &GenerationConfig) -> String {
    if config.audience.trim().is_empty() {
        "a general audience".to_string()
    } else {
        config.audience.trim().to_string()
    }
}

/// 大纲提示词
pub fn outline_prompt(config: &GenerationConfig) -> String {
    let unit = match config.format {
        DocumentFormat::Document => "chapters",
        DocumentFormat::SlideDeck => "slides",
    };

    let mut prompt = format!(
        "Plan a {} about \"{}\" for {}. Use a {} tone. \
         Propose a compelling title and about {} {}, each with a title and a one-sentence description.",
        config.format.as_str(),
        config.topic.trim(),
        audience_line(config),
        config.tone.as_str(),
        config.section_count.value(),
        unit,
    );
    if !config.title.trim().is_empty() {
        prompt.push_str(&format!(
            " The author suggested the working title \"{}\".",
            config.title.trim()
        ));
    }
    prompt
}

/// 章节正文提示词
pub fn section_text_prompt(request: &SectionTextRequest) -> String {
    let config = &request.config;
    let body = match config.format {
        DocumentFormat::Document => {
            "Write this chapter in Markdown: several well-developed paragraphs, subheadings where useful."
        }
        DocumentFormat::SlideDeck => {
            "Write the content of this slide in Markdown: a short heading and at most six concise bullet points."
        }
    };

    let mut prompt = format!(
        "You are writing \"{}\", a {} for {}, in a {} tone.\n\
         Current part: \"{}\". Guidance: {}\n{}",
        request.project_title,
        config.format.as_str(),
        audience_line(config),
        config.tone.as_str(),
        request.section_title,
        request.section_description,
        body,
    );
    if let Some(previous) = request.previous_context.as_deref().filter(|p| !p.is_empty()) {
        prompt.push_str(&format!(
            "\nThe previous part covered: {}. Continue naturally without repeating it.",
            previous
        ));
    }
    if !config.author_name.trim().is_empty() {
        prompt.push_str(&format!("\nWrite in the voice of {}.", config.author_name.trim()));
    }
    prompt.push_str("\nDo not repeat the part title as a heading.");
    prompt
}
