//! Prompt templates sent to the completion service

const OUTPUT_FORMAT: &str = r#"Output format:
{
  "html": "The complete HTML markup. No <style> or <script> tags, no inline CSS or JavaScript.",
  "css": "The complete stylesheet, including every responsive rule and breakpoint.",
  "js": "JavaScript for interactivity, or an empty string when none is needed."
}

Answer with this JSON object only. No explanations, no Markdown, no text before or after it. The JSON must parse."#;

const DESIGN_RULES: &str = "\
Rules:
1. Position: place every element where it sits in the design. Keep the visual hierarchy and reading order; do not recenter or reorder anything.
2. Spacing: reproduce margins, padding and gaps as drawn. Measure them from the design instead of estimating.
3. Responsiveness: the page must work from 320px phones up to wide desktops. Build mobile-first with flexbox, grid, clamp() and media queries. No horizontal overflow.
4. Units: px for exact desktop measurements; rem, % or clamp() where sizes must scale.
5. Semantics: use semantic elements, visible focus states and readable contrast.";

const NO_IMAGES_RULE: &str = "\
6. Images: this design has no photographs or pictures. Do not emit any <img> tags or references to image files; build everything from text, shapes and CSS.";

const WITH_IMAGES_RULE: &str = "\
6. Images: emit exactly one <img> tag for every picture in the design, in reading order (top to bottom, left to right). Give each one a descriptive alt text and any placeholder src; the sources are replaced afterwards.";

/// Prompt for turning a design image into code.
///
/// `custom_instructions` is appended verbatim when non-blank.
pub fn design_prompt(no_images: bool, custom_instructions: &str) -> String {
    let (summary, image_rule) = if no_images {
        (
            "The design contains no images, only text, shapes and layout.",
            NO_IMAGES_RULE,
        )
    } else {
        (
            "The design contains images whose sources will be supplied separately.",
            WITH_IMAGES_RULE,
        )
    };

    let mut prompt = format!(
        "You are an expert front-end developer. Convert the attached website design into production-ready, responsive HTML, CSS and JavaScript that matches it as closely as possible. {}\n\n{}\n{}\n\n{}",
        summary, DESIGN_RULES, image_rule, OUTPUT_FORMAT
    );
    append_custom(&mut prompt, custom_instructions);
    prompt
}

/// Prompt for applying a change to existing code.
///
/// The current code travels alongside as context; this text only carries
/// the request and the ground rules for editing.
pub fn modification_prompt(request: &str) -> String {
    format!(
        "{}\n\nApply only this change. Keep the existing structure, layout, spacing and responsive behaviour intact, preserve interactive behaviour and accessibility, and return the complete code, not a diff.",
        request.trim()
    )
}

fn append_custom(prompt: &mut String, custom_instructions: &str) {
    let custom = custom_instructions.trim();
    if !custom.is_empty() {
        prompt.push_str("\n\nAdditional Instructions:\n");
        prompt.push_str(custom);
    }
}
