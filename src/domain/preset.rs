//! Built-in definition of the surgical-queue entry form.

use super::definition::{
    ChoiceOption, DependencyDefinition, FieldDefinition, FieldKind, FormDefinition,
    PredicateSpec, SectionDefinition, TargetDefinition, VisibilityDefinition,
};

pub const ESPECIALIDADE_URL: &str = "/fila/api/especialidade-autocomplete/";
pub const PROCEDIMENTO_URL: &str = "/fila/api/procedimento-autocomplete/";
pub const MEDICO_URL: &str = "/fila/api/medico-autocomplete/";
pub const PACIENTE_URL: &str = "/fila/api/paciente-autocomplete/";

const PROCEDIMENTO_ENABLED: &str = "Digite para buscar procedimento…";
const PROCEDIMENTO_DISABLED: &str = "Selecione uma especialidade primeiro…";

/// The queue entry form: cascading especialidade/procedimento lookups, the
/// optional secondary pair, the judicial block and the priority rationale.
pub fn fila_form() -> FormDefinition {
    let fields = vec![
        FieldDefinition::new("id_especialidade_api", FieldKind::Lookup)
            .with_label("Especialidade")
            .required()
            .with_placeholder("Digite para buscar especialidade…")
            .with_autocomplete(ESPECIALIDADE_URL),
        FieldDefinition::new("id_procedimento_api", FieldKind::Lookup)
            .with_label("Procedimento")
            .required()
            .with_placeholder(PROCEDIMENTO_DISABLED)
            .with_autocomplete(PROCEDIMENTO_URL),
        FieldDefinition::new("id_medico_api", FieldKind::Lookup)
            .with_label("Médico")
            .required()
            .with_placeholder("Digite para buscar médico…")
            .with_autocomplete(MEDICO_URL),
        FieldDefinition::new("id_prontuario", FieldKind::Lookup)
            .with_label("Paciente")
            .required()
            .with_placeholder("Digite nº ou nome do paciente…")
            .with_autocomplete(PACIENTE_URL),
        FieldDefinition::new("id_secondary_section_open", FieldKind::Hidden),
        FieldDefinition::new("id_especialidade_secundario_api", FieldKind::Lookup)
            .with_label("Especialidade (secundária)")
            .with_placeholder("Digite para buscar especialidade (sec.)…")
            .with_autocomplete(ESPECIALIDADE_URL),
        FieldDefinition::new("id_procedimento_secundario_api", FieldKind::Lookup)
            .with_label("Procedimento (secundário)")
            .with_placeholder(PROCEDIMENTO_DISABLED)
            .with_autocomplete(PROCEDIMENTO_URL),
        FieldDefinition::new("id_prioridade", FieldKind::Select)
            .with_label("Prioridade")
            .with_options(vec![
                ChoiceOption::new("ONC", "Paciente Oncológico"),
                ChoiceOption::new("BRE", "Com Prioridade"),
                ChoiceOption::new("SEM", "Sem Prioridade"),
            ]),
        FieldDefinition::new("id_prioridade_justificativa", FieldKind::Textarea)
            .with_label("Justificativa da prioridade"),
        FieldDefinition::new("id_medida_judicial", FieldKind::Checkbox)
            .with_label("Medida judicial"),
        FieldDefinition::new("id_judicial_numero", FieldKind::Text)
            .with_label("Número do processo")
            .with_placeholder("Insira o número do processo..."),
        FieldDefinition::new("id_judicial_descricao", FieldKind::Textarea)
            .with_label("Descrição")
            .with_placeholder("Descreva o teor da medida judicial..."),
        FieldDefinition::new("id_judicial_anexos", FieldKind::Text).with_label("Anexos"),
    ];

    let dependencies = vec![
        procedimento_edge("id_procedimento_api", "id_especialidade_api"),
        procedimento_edge(
            "id_procedimento_secundario_api",
            "id_especialidade_secundario_api",
        ),
    ];

    let visibility = vec![
        VisibilityDefinition {
            driver: "id_medida_judicial".to_string(),
            predicate: PredicateSpec::Checked,
            block: Some("judicial-fields-block-full".to_string()),
            targets: ["id_judicial_numero", "id_judicial_descricao", "id_judicial_anexos"]
                .into_iter()
                .map(|field| TargetDefinition {
                    field: field.to_string(),
                    required_when_shown: false,
                })
                .collect(),
        },
        VisibilityDefinition {
            driver: "id_prioridade".to_string(),
            predicate: PredicateSpec::NoneOf {
                values: vec!["SEM".to_string(), String::new()],
            },
            block: None,
            targets: vec![TargetDefinition {
                field: "id_prioridade_justificativa".to_string(),
                required_when_shown: true,
            }],
        },
    ];

    let sections = vec![SectionDefinition {
        id: "secondary-block".to_string(),
        title: Some("Proc. secundário".to_string()),
        marker: Some("id_secondary_section_open".to_string()),
        fields: vec![
            "id_especialidade_secundario_api".to_string(),
            "id_procedimento_secundario_api".to_string(),
        ],
    }];

    FormDefinition {
        id: "lec-form".to_string(),
        title: Some("Fila cirúrgica".to_string()),
        action: None,
        fields,
        dependencies,
        visibility,
        sections,
        payload_schema: None,
    }
}

fn procedimento_edge(child: &str, parent: &str) -> DependencyDefinition {
    DependencyDefinition {
        child: child.to_string(),
        parent: parent.to_string(),
        filter_key: "especialidade_id".to_string(),
        placeholder_enabled: Some(PROCEDIMENTO_ENABLED.to_string()),
        placeholder_disabled: Some(PROCEDIMENTO_DISABLED.to_string()),
    }
}
