use ocrline::domain::JobId;

#[test]
fn given_two_new_ids_when_compared_then_distinct() {
    assert_ne!(JobId::new(), JobId::new());
}

#[test]
fn given_id_when_displayed_then_parses_back_to_same_id() {
    let id = JobId::new();

    let parsed: JobId = id.to_string().parse().unwrap();

    assert_eq!(parsed, id);
}

#[test]
fn given_id_when_displayed_then_is_hyphenated_uuid() {
    let rendered = JobId::new().to_string();

    assert_eq!(rendered.len(), 36);
    assert_eq!(rendered.matches('-').count(), 4);
}

#[test]
fn given_free_text_when_parsing_then_rejected() {
    assert!("nonexistent".parse::<JobId>().is_err());
    assert!("../etc/passwd".parse::<JobId>().is_err());
}
