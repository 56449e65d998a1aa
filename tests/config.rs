// tests/config.rs
use figment::Jail;
use house_price::config_loader::load_config;
use house_price::feature_spec::BoundsPolicy;
use house_price::{FeatureSetVariant, RatioMode};
use std::path::PathBuf;

#[test]
fn defaults_apply_without_config_file() {
    Jail::expect_with(|_jail| {
        let config = load_config(None).map_err(|e| e.to_string())?;
        assert_eq!(config.model_path, PathBuf::from("artifacts/model.json"));
        assert_eq!(config.scaler_path, PathBuf::from("artifacts/scaler.json"));
        assert_eq!(config.variant, FeatureSetVariant::Raw);
        assert_eq!(config.ratio_mode, RatioMode::AcceptAsInput);
        assert_eq!(config.bounds_policy, BoundsPolicy::Reject);
        assert_eq!(config.price_unit, 100_000.0);
        assert_eq!(config.currency_symbol, "$");
        assert!(config.model_sha256.is_none());
        Ok(())
    });
}

#[test]
fn toml_then_env_layer_over_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "house_price.toml",
            r#"
                model_path = "models/forest.json"
                variant = "extended"
                bounds_policy = "clamp"
                ratio_mode = "accept_as_input"
            "#,
        )?;
        jail.set_env("HOUSE_PRICE_RATIO_MODE", "derive_from_raw");
        jail.set_env("HOUSE_PRICE_CURRENCY_SYMBOL", "US$");

        let config = load_config(None).map_err(|e| e.to_string())?;
        assert_eq!(config.model_path, PathBuf::from("models/forest.json"));
        assert_eq!(config.variant, FeatureSetVariant::Extended);
        assert_eq!(config.bounds_policy, BoundsPolicy::Clamp);
        assert_eq!(config.ratio_mode, RatioMode::DeriveFromRaw);
        assert_eq!(config.currency_symbol, "US$");
        Ok(())
    });
}

#[test]
fn explicit_config_path_from_env() {
    Jail::expect_with(|jail| {
        jail.create_file("prod.toml", r#"scaler_path = "/srv/scaler.json""#)?;
        jail.set_env("HOUSE_PRICE_CONFIG", "prod.toml");

        let config = load_config(None).map_err(|e| e.to_string())?;
        assert_eq!(config.scaler_path, PathBuf::from("/srv/scaler.json"));
        Ok(())
    });
}

#[test]
fn non_positive_price_unit_fails_fast() {
    Jail::expect_with(|jail| {
        jail.set_env("HOUSE_PRICE_PRICE_UNIT", "-5");
        let err = load_config(None).unwrap_err();
        assert!(err.to_string().contains("price_unit"));
        Ok(())
    });
}

#[test]
fn unknown_log_level_fails() {
    Jail::expect_with(|jail| {
        jail.set_env("HOUSE_PRICE_LOG_LEVEL", "chatty");
        assert!(load_config(None).is_err());
        Ok(())
    });
}

#[test]
fn malformed_checksum_fails() {
    Jail::expect_with(|jail| {
        jail.create_file("house_price.toml", r#"model_sha256 = "not-a-digest""#)?;
        let err = load_config(None).unwrap_err();
        assert!(err.to_string().contains("model_sha256"));
        Ok(())
    });
}

#[test]
fn unknown_variant_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("HOUSE_PRICE_VARIANT", "nine_fields");
        assert!(load_config(None).is_err());
        Ok(())
    });
}
