/// Fixed instruction sent ahead of every theme.
const INSTRUCTION: &str = r##"You are an expert designer and color theorist.
Your task is to generate a harmonious and functional 5-color palette based on a theme.
You must return ONLY a single, valid JSON object inside <json> tags. Do not include any other text or markdown formatting.

Example Request: "A serene beach at sunset"
Example Response:
<json>
{
  "palette": [
    {"role": "Primary", "hex": "#f2a65e", "name": "Sunset Orange"},
    {"role": "Secondary", "hex": "#738fa7", "name": "Dusky Blue"},
    {"role": "Accent", "hex": "#ffcdab", "name": "Sandy Peach"},
    {"role": "Neutral", "hex": "#f5f5f5", "name": "Cloud White"},
    {"role": "Dark", "hex": "#343a40", "name": "Deep Sea"}
  ],
  "justification": "This palette captures the warm, calming tones of a beach sunset. The orange and peach reflect the sun's glow, while the dusky blue and deep sea represent the water and encroaching night."
}
</json>"##;

/// Build the generation prompt for `theme`.
///
/// The theme is embedded verbatim. Nothing guards against a theme that tries to
/// override the instruction, so the extracted payload must be treated as untrusted.
pub fn build_prompt(theme: &str) -> String {
    format!("{INSTRUCTION}\n\nThe theme is: '{theme}'.\n")
}
