#![no_main]

use convsep_spec::{validate_config, PipelineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = PipelineConfig::from_json(text) {
        let result = validate_config(&config);
        assert_eq!(result.is_ok(), config.validate().is_ok());
        if let Ok(json) = config.to_json_pretty() {
            let _ = PipelineConfig::from_json(&json);
        }
    }
});
