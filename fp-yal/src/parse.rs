use crate::lex::{Lexer, Token};
use crate::{
    Design, LayerKind, Module, ModuleKind, NetworkEntry, ParseError, Signal, TerminalKind,
};
use fp_types::Dim;

/// Parse a whole YAL file into its modules and the single PARENT module.
pub fn parse(text: &str) -> Result<Design, ParseError> {
    let mut parser = Parser {
        lexer: Lexer::new(text),
    };
    let mut modules = Vec::new();
    let mut parent = None;
    while let Some(token) = parser.lexer.next_token()? {
        parser.expect_keyword(token, "MODULE")?;
        let module = parser.module()?;
        if module.kind == ModuleKind::Parent {
            if parent.replace(module).is_some() {
                return Err(ParseError::MultipleParents);
            }
        } else {
            modules.push(module);
        }
    }
    match parent {
        Some(parent) => Ok(Design { modules, parent }),
        None => Err(ParseError::NoParent),
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl Parser<'_> {
    fn next(&mut self) -> Result<Token, ParseError> {
        self.lexer.next_token()?.ok_or(ParseError::UnexpectedEof {
            line: self.lexer.line(),
        })
    }

    fn unexpected(&self, found: &Token, expected: &'static str) -> ParseError {
        ParseError::Unexpected {
            line: self.lexer.line(),
            found: found.describe(),
            expected,
        }
    }

    fn word(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.next()? {
            Token::Word(w) => Ok(w),
            other => Err(self.unexpected(&other, expected)),
        }
    }

    fn int(&mut self, expected: &'static str) -> Result<Dim, ParseError> {
        match self.next()? {
            Token::Int(v) => Ok(v as Dim),
            other => Err(self.unexpected(&other, expected)),
        }
    }

    fn number(&mut self, expected: &'static str) -> Result<f64, ParseError> {
        match self.next()? {
            Token::Int(v) => Ok(v as f64),
            Token::Float(v) => Ok(v),
            other => Err(self.unexpected(&other, expected)),
        }
    }

    fn semi(&mut self) -> Result<(), ParseError> {
        match self.next()? {
            Token::Semi => Ok(()),
            other => Err(self.unexpected(&other, "\";\"")),
        }
    }

    fn expect_keyword(&mut self, token: Token, keyword: &'static str) -> Result<(), ParseError> {
        match token {
            Token::Word(ref w) if w == keyword => Ok(()),
            other => Err(self.unexpected(&other, keyword)),
        }
    }

    /// `MODULE` has been consumed; parse through `ENDMODULE;`.
    fn module(&mut self) -> Result<Module, ParseError> {
        let name = self.word("a module name")?;
        self.semi()?;
        let mut module = Module {
            name,
            kind: ModuleKind::Standard,
            xpos: Vec::new(),
            ypos: Vec::new(),
            iolist: Vec::new(),
            network: Vec::new(),
        };
        loop {
            let section = self.word("a module section or ENDMODULE")?;
            match section.as_str() {
                "TYPE" => {
                    let kind = self.word("a module type")?;
                    module.kind = match kind.as_str() {
                        "STANDARD" => ModuleKind::Standard,
                        "PAD" => ModuleKind::Pad,
                        "GENERAL" => ModuleKind::General,
                        "PARENT" => ModuleKind::Parent,
                        _ => {
                            return Err(ParseError::UnknownKeyword {
                                line: self.lexer.line(),
                                what: "module type",
                                name: kind,
                            })
                        }
                    };
                    self.semi()?;
                }
                "DIMENSIONS" => self.dimensions(&mut module)?,
                "IOLIST" => {
                    self.semi()?;
                    loop {
                        let word = self.word("a signal name or ENDIOLIST")?;
                        if word == "ENDIOLIST" {
                            self.semi()?;
                            break;
                        }
                        module.iolist.push(self.signal(word)?);
                    }
                }
                "NETWORK" => {
                    self.semi()?;
                    loop {
                        let word = self.word("an instance name or ENDNETWORK")?;
                        if word == "ENDNETWORK" {
                            self.semi()?;
                            break;
                        }
                        module.network.push(self.network_entry(word)?);
                    }
                }
                "ENDMODULE" => {
                    self.semi()?;
                    return Ok(module);
                }
                _ => {
                    return Err(ParseError::UnknownKeyword {
                        line: self.lexer.line(),
                        what: "module section",
                        name: section,
                    })
                }
            }
        }
    }

    /// `DIMENSIONS x1 y1 x2 y2 ... ;`
    fn dimensions(&mut self, module: &mut Module) -> Result<(), ParseError> {
        loop {
            match self.next()? {
                Token::Semi => break,
                Token::Int(x) => {
                    module.xpos.push(x as Dim);
                    module.ypos.push(self.int("a y coordinate")?);
                }
                other => return Err(self.unexpected(&other, "a vertex coordinate or \";\"")),
            }
        }
        Ok(())
    }

    /// `name {B|PI|PO|PB|F|PWR|GND} x y w layer [CURRENT c] [VOLTAGE v] ;`
    fn signal(&mut self, name: String) -> Result<Signal, ParseError> {
        let terminal = self.word("a terminal type")?;
        let terminal = match terminal.as_str() {
            "B" => TerminalKind::Bidirectional,
            "PI" => TerminalKind::PadInput,
            "PO" => TerminalKind::PadOutput,
            "PB" => TerminalKind::PadBidirectional,
            "F" => TerminalKind::Feedthrough,
            "PWR" => TerminalKind::Power,
            "GND" => TerminalKind::Ground,
            _ => {
                return Err(ParseError::UnknownKeyword {
                    line: self.lexer.line(),
                    what: "terminal type",
                    name: terminal,
                })
            }
        };
        let x = self.int("an x position")?;
        let y = self.int("a y position")?;
        let width = self.int("a width")?;
        let layer = self.word("a layer")?;
        let layer = match layer.as_str() {
            "PDIFF" => LayerKind::PDiff,
            "NDIFF" => LayerKind::NDiff,
            "POLY" => LayerKind::Poly,
            "METAL1" => LayerKind::Metal1,
            "METAL2" => LayerKind::Metal2,
            _ => {
                return Err(ParseError::UnknownKeyword {
                    line: self.lexer.line(),
                    what: "layer",
                    name: layer,
                })
            }
        };
        let mut signal = Signal {
            name,
            terminal,
            x,
            y,
            width,
            layer,
            current: None,
            voltage: None,
        };
        loop {
            match self.next()? {
                Token::Semi => return Ok(signal),
                Token::Word(w) if w == "CURRENT" => {
                    signal.current = Some(self.number("a current value")?);
                }
                Token::Word(w) if w == "VOLTAGE" => {
                    signal.voltage = Some(self.number("a voltage value")?);
                }
                other => {
                    return Err(self.unexpected(&other, "CURRENT, VOLTAGE, or \";\""))
                }
            }
        }
    }

    /// `inst_name module_name sig1 sig2 ... ;`
    fn network_entry(&mut self, instance: String) -> Result<NetworkEntry, ParseError> {
        let module = self.word("a module name")?;
        let mut signals = Vec::new();
        loop {
            match self.next()? {
                Token::Semi => break,
                Token::Word(w) => signals.push(w),
                other => return Err(self.unexpected(&other, "a signal name or \";\"")),
            }
        }
        Ok(NetworkEntry {
            instance,
            module,
            signals,
        })
    }
}
