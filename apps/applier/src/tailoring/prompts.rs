// Prompt constants for resume tailoring.

pub const TAILOR_SYSTEM: &str = "You are an expert resume editor. \
    Return only the finished resume as plain text. \
    Do NOT include commentary, explanations or markdown code fences.";

/// Replace `{title}`, `{company}`, `{job_description}` and `{resume}` before sending.
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"Tailor the following resume to better fit the job below.
Integrate relevant skills, tools and keywords from the job description while preserving
the candidate's real background. Never invent employers, dates, degrees or metrics.

--- JOB ---
Title: {title}
Company: {company}

{job_description}

--- ORIGINAL RESUME ---
{resume}

--- TAILORED RESUME ---
"#;
