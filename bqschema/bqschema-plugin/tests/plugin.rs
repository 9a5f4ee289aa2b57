
use bqschema_core::FieldOptions;
use bqschema_plugin::{
    PluginConfig, PluginError, PluginRequest, extract_annotations, generate, generate_from_bytes,
};
use prost::Message;
use prost_types::{
    DescriptorProto,
    compiler::code_generator_response::Feature,
    field_descriptor_proto::{Label, Type},
};
use test_helpers::*;

fn request_bytes(requested: &[&str], user_files: &[Vec<u8>]) -> Vec<u8> {
    let mut files = option_files();
    files.extend_from_slice(user_files);
    encode_request(requested, None, &files)
}

fn shop_file() -> Vec<u8> {
    encode_file(
        user_file("shop/events.proto", "shop.events"),
        &[
            RawMessage::new(
                "Purchase",
                vec![
                    scalar("order_id", 1, Type::String).with_options(field_overrides(
                        BigQueryFieldOptions {
                            require: true,
                            description: "order identifier".to_string(),
                            ..Default::default()
                        },
                    )),
                    scalar("card_number", 2, Type::String).with_options(field_overrides(
                        BigQueryFieldOptions {
                            ignore: true,
                            ..Default::default()
                        },
                    )),
                    record("buyer", 3, ".shop.events.Buyer", Label::Optional),
                    labeled("sku", 4, Type::Int64, Label::Repeated),
                ],
            )
            .with_options(event_options("purchase", 2)),
            RawMessage::new("Buyer", vec![scalar("email", 1, Type::String)]),
            RawMessage::new("Draft", vec![scalar("note", 1, Type::String)]),
        ],
    )
}

#[test]
fn annotations_are_read_from_custom_options() {
    let bytes = request_bytes(&["shop/events.proto"], &[shop_file()]);
    let request = PluginRequest::decode(&bytes).unwrap();
    let pool = request.descriptor_pool();
    let annotations = extract_annotations(&pool, &PluginConfig::default());

    let purchase = annotations.message("shop.events.Purchase").unwrap();
    assert_eq!(purchase.event_name.as_deref(), Some("purchase"));
    assert_eq!(purchase.event_version, Some(2));
    assert!(annotations.message("shop.events.Draft").is_none());
    assert_eq!(
        annotations.field("shop.events.Purchase", "card_number"),
        Some(&FieldOptions {
            ignore: true,
            ..Default::default()
        })
    );
    assert_eq!(
        annotations
            .message_options("shop.events.Purchase")
            .unwrap()
            .table_name,
        "purchase_v2"
    );
}

#[test]
fn generates_schema_for_annotated_messages() {
    let bytes = request_bytes(&["shop/events.proto"], &[shop_file()]);
    let response = generate_from_bytes(&bytes).unwrap();

    assert_eq!(response.error, None);
    assert_eq!(
        response.supported_features,
        Some(Feature::Proto3Optional as u64)
    );
    assert_eq!(response.file.len(), 1);
    let file = &response.file[0];
    assert_eq!(file.name(), "shop/events/purchase_v2.schema");

    let content: serde_json::Value = serde_json::from_str(file.content()).unwrap();
    assert_eq!(
        content,
        serde_json::json!([
            {
                "name": "order_id",
                "type": "STRING",
                "mode": "REQUIRED",
                "description": "order identifier"
            },
            {
                "name": "buyer",
                "type": "RECORD",
                "mode": "NULLABLE",
                "fields": [{ "name": "email", "type": "STRING", "mode": "NULLABLE" }]
            },
            { "name": "sku", "type": "INTEGER", "mode": "REPEATED" }
        ])
    );
}

#[test]
fn only_requested_files_are_generated() {
    let other = encode_file(
        user_file("other.proto", "other"),
        &[RawMessage::new("Click", vec![scalar("x", 1, Type::Int32)])
            .with_options(event_options("click", 1))],
    );
    let bytes = request_bytes(&["other.proto"], &[shop_file(), other]);
    let response = generate_from_bytes(&bytes).unwrap();

    let names: Vec<_> = response.file.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["other/click_v1.schema"]);
}

#[test]
fn message_without_event_version_is_skipped() {
    let partial = EventMessageOptions {
        event_name: Some("half".to_string()),
        event_version: None,
        bigquery_opts: Some(BigQueryMessageOptions {
            table_name: "legacy_table".to_string(),
            use_json_names: false,
        }),
    }
    .encode_to_vec();
    let file = encode_file(
        user_file("half.proto", "half"),
        &[RawMessage::new("Half", vec![scalar("x", 1, Type::Int32)]).with_options(partial)],
    );
    let bytes = request_bytes(&["half.proto"], &[file]);

    let request = PluginRequest::decode(&bytes).unwrap();
    let pool = request.descriptor_pool();
    let annotations = extract_annotations(&pool, &PluginConfig::default());
    assert_eq!(
        annotations.message("half.Half").unwrap().table_name.as_deref(),
        Some("legacy_table")
    );

    let response = generate_from_bytes(&bytes).unwrap();
    assert_eq!(response.error, None);
    assert!(response.file.is_empty());
}

#[test]
fn json_names_from_table_options() {
    let options = EventMessageOptions {
        event_name: Some("profile".to_string()),
        event_version: Some(1),
        bigquery_opts: Some(BigQueryMessageOptions {
            table_name: String::new(),
            use_json_names: true,
        }),
    }
    .encode_to_vec();
    // protoc always fills in json_name.
    let mut display_name = scalar("display_name", 1, Type::String);
    display_name.field.json_name = Some("displayName".to_string());
    let file = encode_file(
        user_file("profile.proto", "acct"),
        &[RawMessage::new("Profile", vec![display_name]).with_options(options)],
    );
    let bytes = request_bytes(&["profile.proto"], &[file]);
    let response = generate_from_bytes(&bytes).unwrap();

    assert_eq!(response.file[0].name(), "acct/profile_v1.schema");
    assert!(response.file[0].content().contains("\"displayName\""));
}

#[test]
fn nested_message_fields_carry_overrides() {
    let nested = DescriptorProto {
        name: Some("Line".to_string()),
        field: vec![prost_types::FieldDescriptorProto {
            name: Some("qty".to_string()),
            number: Some(1),
            r#type: Some(Type::Int32.into()),
            label: Some(Label::Optional.into()),
            ..Default::default()
        }],
        ..Default::default()
    };
    let file = encode_file(
        user_file("order.proto", "orders"),
        &[RawMessage::new(
            "Order",
            vec![record("lines", 1, ".orders.Order.Line", Label::Repeated)],
        )
        .with_nested(vec![nested])
        .with_options(event_options("order", 7))],
    );
    let bytes = request_bytes(&["order.proto"], &[file]);
    let response = generate_from_bytes(&bytes).unwrap();

    let content: serde_json::Value = serde_json::from_str(response.file[0].content()).unwrap();
    assert_eq!(content[0]["name"], "lines");
    assert_eq!(content[0]["mode"], "REPEATED");
    assert_eq!(content[0]["fields"][0]["name"], "qty");
}

#[test]
fn custom_extension_names_from_parameter() {
    let config = PluginConfig::from_parameter(
        "event_name_extension=.acme.name, event_version_extension=acme.version",
    )
    .unwrap();
    assert_eq!(config.event_name_extension, "acme.name");
    assert_eq!(config.event_version_extension, "acme.version");
    assert_eq!(config.field_extension, PluginConfig::default().field_extension);

    assert_eq!(PluginConfig::from_parameter("").unwrap(), PluginConfig::default());
    assert!(matches!(
        PluginConfig::from_parameter("no_equals"),
        Err(PluginError::InvalidParameter { .. })
    ));
    assert!(matches!(
        PluginConfig::from_parameter("colour=blue"),
        Err(PluginError::InvalidParameter { .. })
    ));
}

#[test]
fn invalid_parameter_is_reported_in_response() {
    let mut files = option_files();
    files.push(shop_file());
    let bytes = encode_request(&["shop/events.proto"], Some("bogus"), &files);

    let response = generate_from_bytes(&bytes).unwrap();
    assert!(response.file.is_empty());
    assert!(response.error().contains("invalid plugin parameter"));
}

#[test]
fn unknown_extension_names_disable_annotations() {
    let mut files = option_files();
    files.push(shop_file());
    let bytes = encode_request(
        &["shop/events.proto"],
        Some("event_name_extension=acme.missing"),
        &files,
    );

    let response = generate_from_bytes(&bytes).unwrap();
    assert_eq!(response.error, None);
    assert!(response.file.is_empty());
}

#[test]
fn missing_requested_file_is_an_error() {
    let bytes = request_bytes(&["nowhere.proto"], &[shop_file()]);
    let request = PluginRequest::decode(&bytes).unwrap();

    let err = generate(&request).unwrap_err();
    assert!(matches!(err, PluginError::FileNotFound { ref file } if file == "nowhere.proto"));
}

#[test]
fn first_missing_requested_file_is_reported() {
    let bytes = request_bytes(&["zzz.proto", "shop/events.proto", "aaa.proto"], &[shop_file()]);
    let request = PluginRequest::decode(&bytes).unwrap();

    for _ in 0..5 {
        let err = generate(&request).unwrap_err();
        assert_eq!(err.to_string(), "requested file 'zzz.proto' not found in request");
    }
}

#[test]
fn duplicate_message_names_keep_last_definition() {
    let first = encode_file(
        user_file("a.proto", "shop"),
        &[
            RawMessage::new(
                "Purchase",
                vec![record("buyer", 1, ".shop.Buyer", Label::Optional)],
            )
            .with_options(event_options("purchase", 1)),
            RawMessage::new("Buyer", vec![scalar("email", 1, Type::String)]),
        ],
    );
    let second = encode_file(
        user_file("b.proto", "shop"),
        &[RawMessage::new("Buyer", vec![scalar("phone", 1, Type::String)])],
    );
    let bytes = request_bytes(&["a.proto", "b.proto"], &[first, second]);
    let response = generate_from_bytes(&bytes).unwrap();

    assert_eq!(response.error, None);
    assert_eq!(response.file.len(), 1);
    assert_eq!(response.file[0].name(), "shop/purchase_v1.schema");
    let content: serde_json::Value = serde_json::from_str(response.file[0].content()).unwrap();
    assert_eq!(
        content,
        serde_json::json!([{
            "name": "buyer",
            "type": "RECORD",
            "mode": "NULLABLE",
            "fields": [{ "name": "phone", "type": "STRING", "mode": "NULLABLE" }]
        }])
    );
}

#[test]
fn legacy_string_table_annotation_is_decoded_but_not_used() {
    let options = LegacyTableOptions {
        event_name: Some("old".to_string()),
        table_name: Some("old_table".to_string()),
    }
    .encode_to_vec();
    let file = encode_file(
        user_file("legacy.proto", "legacy"),
        &[RawMessage::new("Old", vec![scalar("x", 1, Type::Int32)]).with_options(options)],
    );
    let files = vec![
        descriptor_proto_file(),
        event_extensions_file(),
        bq_field_file(),
        legacy_bq_table_file(),
        file,
    ];
    let bytes = encode_request(&["legacy.proto"], None, &files);

    let request = PluginRequest::decode(&bytes).unwrap();
    let annotations = extract_annotations(&request.descriptor_pool(), &PluginConfig::default());
    let old = annotations.message("legacy.Old").unwrap();
    assert_eq!(old.table_name.as_deref(), Some("old_table"));
    assert_eq!(old.event_version, None);
    assert!(annotations.message_options("legacy.Old").is_none());

    let response = generate_from_bytes(&bytes).unwrap();
    assert_eq!(response.error, None);
    assert!(response.file.is_empty());
}

#[test]
fn unsigned_event_version_beyond_i64_is_ignored() {
    let version_file = extension_file(
        "acme/options.proto",
        "acme",
        vec![extension(
            "version64",
            50003,
            Type::Uint64,
            ".google.protobuf.MessageOptions",
        )],
    );
    let mut user = user_file("wide.proto", "wide");
    user.dependency.push("acme/options.proto".to_string());
    let wide = |version: u64| {
        WideVersionOptions {
            event_name: Some("wide".to_string()),
            version: Some(version),
        }
        .encode_to_vec()
    };
    let file = encode_file(
        user,
        &[
            RawMessage::new("Big", vec![scalar("x", 1, Type::Int32)]).with_options(wide(u64::MAX)),
            RawMessage::new("Small", vec![scalar("x", 1, Type::Int32)]).with_options(wide(3)),
        ],
    );
    let mut files = option_files();
    files.push(version_file);
    files.push(file);
    let bytes = encode_request(
        &["wide.proto"],
        Some("event_version_extension=acme.version64"),
        &files,
    );

    let request = PluginRequest::decode(&bytes).unwrap();
    let config = PluginConfig::from_parameter(request.parameter()).unwrap();
    let annotations = extract_annotations(&request.descriptor_pool(), &config);
    assert_eq!(annotations.message("wide.Big").unwrap().event_version, None);
    assert_eq!(annotations.message("wide.Small").unwrap().event_version, Some(3));

    let response = generate_from_bytes(&bytes).unwrap();
    let names: Vec<_> = response.file.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["wide/wide_v3.schema"]);
}

#[test]
fn conversion_failure_names_the_file() {
    let file = encode_file(
        user_file("loop.proto", "loops"),
        &[RawMessage::new(
            "Node",
            vec![
                scalar("value", 1, Type::Int32),
                record("next", 2, ".loops.Node", Label::Optional),
            ],
        )
        .with_options(event_options("node", 1))],
    );
    let bytes = request_bytes(&["loop.proto"], &[file]);

    let response = generate_from_bytes(&bytes).unwrap();
    assert!(response.file.is_empty());
    assert!(response.error().starts_with(
        "Failed to convert loop.proto: field next in loops.Node: cyclic message type loops.Node"
    ));
}

#[test]
fn garbage_request_fails_to_decode() {
    let err = generate_from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
    assert!(matches!(err, PluginError::RequestDecode(_)));
}
