use ocrline::infrastructure::extraction::{ExtractorFactory, ExtractorFactoryError};
use ocrline::presentation::config::{ExtractionSettings, ExtractorProvider};

fn settings(provider: ExtractorProvider) -> ExtractionSettings {
    ExtractionSettings {
        provider,
        default_languages: "en".to_string(),
        default_dpi: 300,
        default_min_confidence: 0.2,
        azure_endpoint: None,
        azure_key: None,
        vlm_base_url: None,
        vlm_model: None,
        vlm_api_key: None,
    }
}

#[test]
fn given_mock_provider_when_creating_then_mock_extractor_returned() {
    let extractor = ExtractorFactory::create(&settings(ExtractorProvider::Mock)).unwrap();

    assert_eq!(extractor.name(), "mock");
}

#[test]
fn given_azure_provider_without_endpoint_when_creating_then_missing_endpoint() {
    let result = ExtractorFactory::create(&settings(ExtractorProvider::Azure));

    assert!(matches!(result, Err(ExtractorFactoryError::MissingAzureEndpoint)));
}

#[test]
fn given_azure_provider_without_key_when_creating_then_missing_key() {
    let mut config = settings(ExtractorProvider::Azure);
    config.azure_endpoint = Some("https://example.cognitiveservices.azure.com".to_string());

    let result = ExtractorFactory::create(&config);

    assert!(matches!(result, Err(ExtractorFactoryError::MissingAzureKey)));
}

#[test]
fn given_azure_provider_fully_configured_when_creating_then_azure_extractor_returned() {
    let mut config = settings(ExtractorProvider::Azure);
    config.azure_endpoint = Some("https://example.cognitiveservices.azure.com/".to_string());
    config.azure_key = Some("secret".to_string());

    let extractor = ExtractorFactory::create(&config).unwrap();

    assert_eq!(extractor.name(), "azure");
}

#[test]
fn given_vlm_provider_without_base_url_when_creating_then_missing_base_url() {
    let result = ExtractorFactory::create(&settings(ExtractorProvider::Vlm));

    assert!(matches!(result, Err(ExtractorFactoryError::MissingVlmBaseUrl)));
}

#[test]
fn given_vlm_provider_without_model_when_creating_then_missing_model() {
    let mut config = settings(ExtractorProvider::Vlm);
    config.vlm_base_url = Some("http://localhost:1234".to_string());

    let result = ExtractorFactory::create(&config);

    assert!(matches!(result, Err(ExtractorFactoryError::MissingVlmModel)));
}
