use filaform::form::FieldValue;
use filaform::{DocumentFormat, FormPage, PageOptions, SubmitOutcome, load_form_definition};
use serde_json::json;

const CONTACT_FORM: &str = r#"{
    "id": "contato",
    "fields": [
        {"id": "telefone", "kind": "text", "required": true, "mask": "phone"},
        {"id": "cpf", "kind": "text", "mask": "cpf"},
        {"id": "tem_responsavel", "kind": "checkbox"},
        {"id": "responsavel", "kind": "text"}
    ],
    "visibility": [
        {
            "driver": "tem_responsavel",
            "predicate": {"when": "checked"},
            "targets": [{"field": "responsavel", "required_when_shown": true}]
        },
        {
            "driver": "fantasma",
            "predicate": {"when": "filled"},
            "targets": [{"field": "cpf"}]
        }
    ],
    "payload_schema": {
        "type": "object",
        "properties": {"cpf": {"type": "string", "pattern": "^([0-9]{11})?$"}}
    }
}"#;

#[test]
fn loads_a_definition_document() {
    let definition = load_form_definition(CONTACT_FORM, DocumentFormat::Json).unwrap();
    assert_eq!(definition.id, "contato");
    assert_eq!(definition.fields.len(), 4);
    assert!(definition.payload_schema.is_some());
}

#[test]
fn rejects_definitions_that_break_the_schema() {
    let err = load_form_definition(r#"{"id": "x", "fields": [{"id": "a"}]}"#, DocumentFormat::Json)
        .unwrap_err();
    assert!(err.to_string().contains("form definition is invalid"), "{err}");
}

#[test]
fn strict_pages_refuse_undeclared_drivers() {
    let definition = load_form_definition(CONTACT_FORM, DocumentFormat::Json).unwrap();
    assert!(FormPage::from_definition(&definition, PageOptions::default()).is_ok());
    let err = FormPage::from_definition(&definition, PageOptions::default().with_strict(true))
        .unwrap_err();
    assert!(err.to_string().contains("fantasma"), "{err}");
}

#[test]
fn masked_values_are_formatted_and_submitted_raw() {
    let definition = load_form_definition(CONTACT_FORM, DocumentFormat::Json).unwrap();
    let mut page = FormPage::from_definition(&definition, PageOptions::default()).unwrap();
    page.set_value("telefone", FieldValue::text("11987654321")).unwrap();
    assert_eq!(page.field("telefone").unwrap().display_value(), "(11) 9 8765-4321");

    page.set_value("cpf", FieldValue::text("12345678901")).unwrap();
    assert_eq!(page.field("cpf").unwrap().display_value(), "123.456.789-01");

    let SubmitOutcome::Proceed(payload) = page.submit() else {
        panic!("submit should proceed");
    };
    assert_eq!(payload["telefone"], json!("11987654321"));
    assert_eq!(payload["cpf"], json!("12345678901"));
}

#[test]
fn checkbox_reveals_a_required_field() {
    let definition = load_form_definition(CONTACT_FORM, DocumentFormat::Json).unwrap();
    let mut page = FormPage::from_definition(&definition, PageOptions::default()).unwrap();
    page.set_value("telefone", FieldValue::text("1133334444")).unwrap();
    page.set_value("tem_responsavel", FieldValue::Checked(true)).unwrap();

    let SubmitOutcome::Blocked(report) = page.submit() else {
        panic!("submit should be blocked");
    };
    assert_eq!(report.first_invalid().map(|id| id.as_str()), Some("responsavel"));

    page.set_value("tem_responsavel", FieldValue::Checked(false)).unwrap();
    assert!(matches!(page.submit(), SubmitOutcome::Proceed(_)));
}
