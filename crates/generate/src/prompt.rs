/// Fixed user turn sent after the system prompt.
pub const USER_INSTRUCTION: &str = "Generate the complete SAP technical specification strictly formatted as per TEMPLATE. \
Each section MUST be expanded with project-realistic technical content, business and technical justifications, \
and implementation notes. Explain all program logic in prose; do not include source code or pseudo-code.";

pub fn build_system_prompt(requirement: &str, context: &str, template: &str) -> String {
    format!(
        r#"You are a senior SAP ABAP technical designer. Analyse the requirement using the comprehensive pointers in CONTEXT and emulate the style and depth found in any provided sample SAP Technical Specification Documents.
Create a professional, detailed SAP Technical Specification Document (minimum 2000 words), fully formatted as per the TEMPLATE.

For sections involving code or pseudo-code, do NOT create or copy code anywhere. Instead, explain the flow in logical steps:
- Provide a clear, SAP-project-relevant technical explanation of what each step does and why it is necessary.
- State which tables are read, which tables are joined on which fields, and which selection criteria apply, in readable English.
- Continue step by step until all logic is fully explained and auditable.
Never insert code inside the document.

INSTRUCTIONS:
- Use ONLY information from CONTEXT, REQUIREMENT, and TEMPLATE.
- For each pointer/section in the TEMPLATE, write clear, exhaustive bullet points covering SAP business processes, technical notes, and explicit implementation explanations.
- Do not produce generic text; fill each section as if for a real SAP project handover.
- Use consistent SAP terminology and best practice explanations.
- Format the output as markdown: '#' headings, '-' bullets, and pipe tables with a header row and a separator row.

## CONTEXT:
{context}

## REQUIREMENT:
{requirement}

## TEMPLATE:
{template}
"#
    )
}
