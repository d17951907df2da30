// Information extractor prompt template.
// The field list below is the contract `ExtractedRecord::from_object` relies on.

pub const RESUME_PARSE_PROMPT: &str = r#"Extract the following structured information from the resume text. {no_fabrication} {json_only}
- name: Full name of the candidate (string)
- education: List of educational qualifications (list of objects)
  Each object contains:
    - institution: Name of the institution (string)
    - location: Location of the institution (string)
    - degree: Degree earned (string)
    - date: Completion date (string)
- nationality: Candidate's nationality (string)
- date_of_birth: Date of birth (string)
- languages: List of languages known (list of strings)
- location: Current location/residence (string)
- experience: List of work experiences (list of objects)
  Each object contains:
    - company_name: Name of the company (string)
    - position: Job title (string)
    - duration: Employment period (string)
    - job_description: All of the job responsibilities, one per line (string)
- certificates: List of valid certificates (list of strings)
- visas: List of valid work visas (list of strings)
- summary: Summary of the candidate's profile (2-3 sentences, string)

Resume text:
{resume_text}
"#;
