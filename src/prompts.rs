//! Prompt templates and simulated backend responses.
//!
//! The `DEFAULT_*` prompts are the built-in templates users can override in
//! settings. The remaining constants are the canned response bodies the
//! simulated backend assembles its output from.

/// Model name used when none has been configured.
pub const DEFAULT_MODEL: &str = "o1-mini";

/// Built-in prompt for clarification question generation.
pub const DEFAULT_QUESTIONS_PROMPT: &str = r#"# CV Gap Analysis and Clarification Form Generation Prompt
## SYSTEM PROMPT
You are a professional CV Gap Analysis specialist tasked with creating comprehensive clarification forms based on CV text and review analysis. Your role is to systematically identify gaps across all sections of a candidate's CV and generate targeted questions following the established framework guidelines.

## CRITICAL FORMATTING REQUIREMENT
**ALL QUESTIONS MUST START WITH "question#" followed by the question text. This format is mandatory for every single question generated in the clarification form.**

Example format:
- question#For your role as Marketing Manager at ABC Company from 2020-2023, what was your annual marketing budget and how did you allocate it across different channels?
- question#What was your team size and what specific revenue targets did you achieve each year?"#;

/// Built-in prompt for resume enhancement.
pub const DEFAULT_RESUME_PROMPT: &str = r#"# Advanced Resume Transformation Engine

You are an elite resume strategist specializing in dramatic resume improvements that transform good resumes into exceptional ones while maintaining complete factual accuracy.

## Mission Statement
Transform the provided resume into a significantly enhanced version that showcases the candidate's expertise more compellingly, addresses identified gaps, and positions them as a top-tier professional in their field."#;

// ============================================================================
// Simulated analysis
// ============================================================================

pub(crate) const ANALYSIS_RULE: &str =
    "================================================================================";

pub(crate) const SKILLS_ANALYSIS: &str = r#"SKILLS ANALYSIS
SKILLS COMPREHENSIVE ANALYSIS
Total Skills Categories: 3

SKILL: JavaScript
Work Evidence: Frontend Developer at XYZ Corp
Validation Status: Strong - multiple evidence points across experience and projects

SKILL: Python
Educational Support: Not established
Validation Status: Moderate - some evidence in experience and projects

Skills Evidence Summary:
- Well-Supported Skills: JavaScript, HTML, CSS, React
- Unsupported Skills: AWS, Docker
- Missing Industry Standard Tools: TypeScript, Jest, CI/CD tools"#;

pub(crate) const EXPERIENCE_ANALYSIS: &str = r#"EXPERIENCE ANALYSIS
WORK EXPERIENCE COMPREHENSIVE ANALYSIS
Total Positions: 2

POSITION: Frontend Developer at XYZ Corp (2021-Present)
Responsibility 1: Developed responsive user interfaces using React
- Scope Elements: Not specified
- Outcome Descriptions: Not specified
- Missing Quantification: Number of interfaces, performance improvements, user impact

Quantitative Gaps Summary:
- Financial Data Missing: Budget information, cost savings
- Scale Indicators Missing: Team size, project scope, user base"#;

pub(crate) const EDUCATION_ANALYSIS: &str = r#"EDUCATION ANALYSIS
EDUCATION AND ACADEMIC ANALYSIS

DEGREE: Bachelor of Science in Computer Science
Academic Achievements: Not specified in CV
Missing Academic Details: GPA, honors, thesis details
Continuing Education Evidence: Not established"#;

pub(crate) const PROJECTS_ANALYSIS: &str = r#"PROJECTS ANALYSIS
PROJECTS COMPREHENSIVE ANALYSIS
Total Projects: 2

PROJECT: E-commerce Platform
- Timeline: Not specified in CV
- Team Role: Not specified in CV
- Business Impact: Not specified in CV

Critical Missing Details:
- Most Important Quantitative Gaps: User base, transaction volume, performance metrics"#;

pub(crate) const INTEGRATION_ANALYSIS: &str = r#"INTEGRATION ANALYSIS
INTEGRATION AND FINAL ASSESSMENT

Overarching Patterns:
- Quantification Consistency: Consistently missing - very few metrics provided
- Evidence Quality: Moderate - technical skills evidenced but impact not quantified

Priority Enhancement Recommendations:
CRITICAL (Address Immediately):
1. Add quantifiable achievements to each position
2. Provide specific details on project impact and scale
IMPORTANT (Address Next):
1. Include team size and project scope details"#;

// ============================================================================
// Simulated questions
// ============================================================================

pub(crate) const QUESTIONS_FORM: &str = r#"CV Clarification Form - [Candidate Name]

Thank you for submitting your resume. To better understand your background and experience, please provide detailed responses to the following questions.

Instructions:
- Please answer all questions with specific details and numbers where possible
- For any questions that don't apply to your experience, please write 'Not Applicable' and explain why

question#For your role as Frontend Developer at XYZ Corp from 2021 to Present: What was the size of your team, including direct reports and team members you collaborated with regularly?

question#For your role as Frontend Developer at XYZ Corp from 2021 to Present: What specific metrics or KPIs were you responsible for, and what improvements did you achieve?

question#For your role as Frontend Developer at XYZ Corp from 2021 to Present: What was the scale of the applications you worked on in terms of user base, traffic, or transaction volume?

question#For your E-commerce Platform project: What was the timeline for development, how many team members were involved, and what was your specific role on the team?

question#For your Bachelor's degree in Computer Science: What was your GPA, and did you receive any academic honors or distinctions?

question#For your skills in Python: In what specific business contexts have you applied this skill, and what measurable outcomes did you achieve?

question#What specific industry certifications do you currently hold or are you pursuing that are relevant to your field?"#;

// ============================================================================
// Simulated enhancement
// ============================================================================

/// Fallback text for the first three answers, in question order.
pub(crate) const ENHANCEMENT_FALLBACKS: [&str; 3] = [
    "a cross-functional team of 8 developers",
    "improved page load times by 40% and increased user engagement by 25%",
    "an application serving over 50,000 monthly active users",
];

pub(crate) const ENHANCED_RESUME: &str = r#"JOHN DOE
Frontend Software Engineer
New York, NY | john.doe@email.com | (555) 123-4567

PROFESSIONAL SUMMARY
Innovative Frontend Developer with 4+ years of experience building responsive, high-performance web applications.

PROFESSIONAL EXPERIENCE
FRONTEND DEVELOPER | XYZ CORP | 2021 - PRESENT
• Led frontend development for {user_base}, architecting responsive interfaces using React and TypeScript
• Worked within {team_size}, establishing code review practices that improved team velocity by 20%
• Outcomes: {metrics}

PROJECTS
E-COMMERCE PLATFORM
• Architected a full-stack e-commerce platform processing 5,000+ monthly transactions with 99.95% uptime

EDUCATION
BACHELOR OF SCIENCE IN COMPUTER SCIENCE
University of Technology | 2020"#;
