//! Front-end for the Delphi unit dialect.

pub mod grammar;

use crate::diagnostic::CompilerError;
use crate::model::File;

use super::{lower, FrontEndParser, ParseOptions};

pub struct DelphiParser;

impl FrontEndParser for DelphiParser {
    fn language(&self) -> &str {
        "delphi"
    }

    fn extensions(&self) -> &[&str] {
        &["pas", "dpr"]
    }

    fn parse(&self, content: &str, options: &ParseOptions) -> Result<File, CompilerError> {
        lower(grammar::parse(content), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;
    use crate::model::Accessor;
    use crate::specialize::identity;

    const UNIT: &str = r#"
/// Media components.
/// @coreType(IUnknown)
unit Acme.Media;

interface

uses Acme.Core;

type
  IPlayer = interface(IUnknown)
    ['{8F2E3C6A-0B1D-4C52-9D7E-1A2B3C4D5E6F}']
    function GetVolume: Single; stdcall;
    procedure SetVolume(const Value: Single); stdcall;
    procedure Fill(var Buffer; out Count: Integer; Items: array of Integer); stdcall;
    property Volume: Single read GetVolume write SetVolume;
  end;

  IRecorder = interface(IUnknown)
    procedure Start; safecall;
  end;

implementation

end.
"#;

    fn parse(source: &str) -> Result<File, CompilerError> {
        DelphiParser.parse(source, &ParseOptions::new("media.pas"))
    }

    #[test]
    fn test_unit_namespace_and_uses() {
        let file = parse(UNIT).unwrap();
        assert_eq!(file.namespace.dotted(), "Acme.Media");
        assert_eq!(file.includes, vec!["Acme.Core"]);
        assert!(file.attributes.is_core("IUnknown"));
        assert_eq!(file.documentation.brief_text(), "Media components.");
    }

    #[test]
    fn test_guid_and_computed_identity() {
        let file = parse(UNIT).unwrap();
        let player = file.interface("IPlayer").unwrap();
        assert!(player.explicit_identity);
        assert_eq!(
            player.identity(&file.registry).unwrap().to_string(),
            "8f2e3c6a-0b1d-4c52-9d7e-1a2b3c4d5e6f"
        );
        let recorder = file.interface("IRecorder").unwrap();
        assert_eq!(
            recorder.identity(&file.registry),
            Some(identity("Acme.Media.IRecorder"))
        );
    }

    #[test]
    fn test_property_lines_bind_accessors() {
        let file = parse(UNIT).unwrap();
        let player = file.interface("IPlayer").unwrap();
        let get = player.method("GetVolume").unwrap().property.as_ref().unwrap();
        assert_eq!((get.name.as_str(), get.accessor), ("Volume", Accessor::Get));
        let set = player.method("SetVolume").unwrap().property.as_ref().unwrap();
        assert_eq!(set.accessor, Accessor::Set);
    }

    #[test]
    fn test_argument_modes() {
        let file = parse(UNIT).unwrap();
        let fill = &file.interface("IPlayer").unwrap().method("Fill").unwrap().overloads[0];
        assert!(fill.arguments[0].is_out_pointer);
        assert_eq!(file.registry.get(fill.arguments[0].ty.id).name, "Pointer");
        assert!(fill.arguments[1].is_out);
        assert!(fill.arguments[2].ty.is_array());
        assert_eq!(fill.calling_convention.as_deref(), Some("stdcall"));
    }

    #[test]
    fn test_second_unit_name_is_rejected() {
        let err = parse("unit A; interface uses X; unit B;").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_repeated_unit_is_rejected() {
        let err = parse("unit A;\nunit A;\ninterface\nimplementation\nend.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position().map(|(line, _)| line), Some(2));
    }

    #[test]
    fn test_property_with_unknown_accessor() {
        let source = "unit U; interface type IFoo = interface(IUnknown) property X: Integer read GetX; end; implementation end.";
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_record_is_unsupported() {
        let source = "unit U; interface type TRec = record A: Integer; end; implementation end.";
        assert!(matches!(
            parse(source).unwrap_err(),
            CompilerError::UnsupportedConstruct { construct, .. } if construct == "record"
        ));
    }
}
