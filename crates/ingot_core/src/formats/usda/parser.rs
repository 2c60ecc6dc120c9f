//! USDA (ASCII) file parser.
//!
//! Line-by-line parsing of USDA text. The parser handles the common
//! authoring patterns only.
//!
//! # Supported Syntax
//!
//! - `def Xform "Name" { ... }` and `def Scope "Name" { ... }`
//! - `def Mesh "Name" { ... }`
//! - `def Material "Name" { ... }` containing `def Shader "Name" { ... }`
//! - `point3f[] points = [...]`
//! - `int[] faceVertexCounts = [...]`
//! - `int[] faceVertexIndices = [...]`
//! - `normal3f[] normals = [...]`
//! - `texCoord2f[] primvars:st = [...]`
//! - `uniform token orientation = "leftHanded"`
//! - `rel material:binding = </Path>`
//! - `uniform token info:id = "..."` and `inputs:*` on shaders
//! - `xformOp:translate`, `xformOp:rotateXYZ`, `xformOp:rotateX/Y/Z`, `xformOp:scale`
//!
//! Prim metadata in parentheses after `def` lines is skipped.

use std::collections::VecDeque;

use ingot_math::{Mat4, Vec2, Vec3};
use thiserror::Error;

use super::types::*;
use crate::importer::FormatError;

/// Errors that can occur during USDA parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid number format at line {line}: {value}")]
    InvalidNumber { line: usize, value: String },

    #[error("Unclosed block starting at line {0}")]
    UnclosedBlock(usize),
}

impl From<ParseError> for FormatError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Parse { line, message } => FormatError::Parse { line, message },
            other => FormatError::Malformed(other.to_string()),
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// USDA file parser.
pub struct UsdaParser {
    lines: VecDeque<(usize, String)>,
    current_line: usize,
}

impl UsdaParser {
    /// Create a new parser from file contents.
    pub fn new(content: &str) -> Self {
        let lines: VecDeque<_> = content
            .lines()
            .enumerate()
            .map(|(i, s)| (i + 1, s.to_string()))
            .collect();

        Self {
            lines,
            current_line: 0,
        }
    }

    /// Parse the USDA content and return the list of root prims.
    pub fn parse(&mut self) -> ParseResult<Vec<UsdPrim>> {
        self.skip_header();

        let mut prims = Vec::new();
        while !self.lines.is_empty() {
            if let Some(prim) = self.parse_prim("")? {
                prims.push(prim);
            } else if self.peek_trimmed() == Some("}") {
                return Err(ParseError::Parse {
                    line: self.lines.front().map_or(0, |(n, _)| *n),
                    message: "Unexpected '}'".to_string(),
                });
            }
        }

        Ok(prims)
    }

    /// Skip the `#usda` line, comments and the layer metadata block.
    fn skip_header(&mut self) {
        let mut in_header_metadata = false;
        while let Some((_, line)) = self.lines.front() {
            let trimmed = line.trim();
            if in_header_metadata {
                if trimmed.ends_with(')') {
                    in_header_metadata = false;
                }
            } else if trimmed.starts_with('(') {
                in_header_metadata = !trimmed.ends_with(')');
            } else if !trimmed.is_empty() && !trimmed.starts_with('#') {
                break;
            }
            self.lines.pop_front();
        }
    }

    fn peek_trimmed(&self) -> Option<&str> {
        self.lines.front().map(|(_, l)| l.trim())
    }

    /// Parse a single prim and its children.
    fn parse_prim(&mut self, parent_path: &str) -> ParseResult<Option<UsdPrim>> {
        // Get next non-empty line
        let (line_num, line) = loop {
            match self.lines.pop_front() {
                Some((num, line)) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        self.current_line = num;
                        break (num, line);
                    }
                }
                None => return Ok(None),
            }
        };

        let trimmed = line.trim();

        // Put closing braces back for the caller to handle
        if trimmed == "}" {
            self.lines.push_front((line_num, line));
            return Ok(None);
        }

        if let Some(def) = trimmed.strip_prefix("def ") {
            let def = def.to_string();
            return self.parse_def(&def, parent_path, line_num).map(Some);
        }

        // Attributes are parsed within prim blocks; anything else at this level is ignored
        Ok(None)
    }

    /// Parse a `def Type "Name"` block. `rest` is the line without `def `.
    fn parse_def(
        &mut self,
        rest: &str,
        parent_path: &str,
        start_line: usize,
    ) -> ParseResult<UsdPrim> {
        let prim_type = rest.split_whitespace().next().unwrap_or("");

        let name = rest
            .split('"')
            .nth(1)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ParseError::Parse {
                line: start_line,
                message: format!("Missing prim name in: def {}", rest),
            })?;

        let path = if parent_path.is_empty() {
            format!("/{}", name)
        } else {
            format!("{}/{}", parent_path, name)
        };

        // Metadata, either `(` on the def line or on the next line
        let after_name = rest.splitn(3, '"').nth(2).unwrap_or("");
        if after_name.contains('(') {
            if !after_name.contains(')') {
                self.skip_metadata(start_line)?;
            }
        } else if self.peek_trimmed().is_some_and(|l| l.starts_with('(')) {
            self.skip_metadata(start_line)?;
        }

        // Empty single-line prim: def Xform "Name" {}
        if after_name.contains('{') && after_name.contains('}') {
            return Ok(match prim_type {
                "Mesh" => UsdPrim::Mesh(UsdMesh {
                    path,
                    name: name.to_string(),
                    ..Default::default()
                }),
                "Material" => UsdPrim::Material(UsdMaterial {
                    path,
                    name: name.to_string(),
                    ..Default::default()
                }),
                "Shader" => UsdPrim::Shader(UsdShader {
                    path,
                    name: name.to_string(),
                    ..Default::default()
                }),
                "Xform" | "Scope" => UsdPrim::Xform(UsdXform {
                    path,
                    name: name.to_string(),
                    ..Default::default()
                }),
                other => UsdPrim::Unknown(other.to_string()),
            });
        }

        if !after_name.contains('{') {
            self.expect_opening_brace(start_line)?;
        }

        match prim_type {
            "Xform" | "Scope" => self
                .parse_xform_content(&path, name, start_line)
                .map(UsdPrim::Xform),
            "Mesh" => self
                .parse_mesh_content(&path, name, start_line)
                .map(UsdPrim::Mesh),
            "Material" => self
                .parse_material_content(&path, name, start_line)
                .map(UsdPrim::Material),
            "Shader" => self
                .parse_shader_content(&path, name, start_line)
                .map(UsdPrim::Shader),
            _ => {
                log::debug!("Skipping unsupported prim type {} at {}", prim_type, path);
                self.skip_block(start_line)?;
                Ok(UsdPrim::Unknown(prim_type.to_string()))
            }
        }
    }

    /// Consume lines up to and including the one closing a metadata block.
    fn skip_metadata(&mut self, start_line: usize) -> ParseResult<()> {
        let mut depth = 0i32;
        loop {
            let (_, line) = self
                .lines
                .pop_front()
                .ok_or(ParseError::UnclosedBlock(start_line))?;
            // The def line's own '(' was not counted
            if depth == 0 && !line.contains('(') && line.contains(')') {
                return Ok(());
            }
            depth += line.matches('(').count() as i32;
            depth -= line.matches(')').count() as i32;
            if depth <= 0 && line.contains(')') {
                return Ok(());
            }
        }
    }

    /// Expect and consume an opening brace on its own line.
    fn expect_opening_brace(&mut self, start_line: usize) -> ParseResult<()> {
        while let Some((_, line)) = self.lines.front() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                self.lines.pop_front();
                continue;
            }
            if trimmed == "{" || trimmed.ends_with('{') {
                self.lines.pop_front();
                return Ok(());
            }
            break;
        }

        Err(ParseError::Parse {
            line: start_line,
            message: "Expected opening brace".to_string(),
        })
    }

    /// Skip a block (consume until matching closing brace).
    fn skip_block(&mut self, start_line: usize) -> ParseResult<()> {
        let mut depth = 1usize;

        while depth > 0 {
            match self.lines.pop_front() {
                Some((_, line)) => {
                    depth += line.matches('{').count();
                    depth = depth.saturating_sub(line.matches('}').count());
                }
                None => return Err(ParseError::UnclosedBlock(start_line)),
            }
        }

        Ok(())
    }

    /// Next meaningful line of a block, `None` at its closing brace.
    fn next_block_line(&mut self, start_line: usize) -> ParseResult<Option<(usize, String)>> {
        loop {
            let (line_num, line) = self
                .lines
                .pop_front()
                .ok_or(ParseError::UnclosedBlock(start_line))?;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed == "}" {
                return Ok(None);
            }

            self.current_line = line_num;
            return Ok(Some((line_num, trimmed.to_string())));
        }
    }

    /// Parse Xform content (transform ops, binding and children).
    fn parse_xform_content(
        &mut self,
        path: &str,
        name: &str,
        start_line: usize,
    ) -> ParseResult<UsdXform> {
        let mut xform = UsdXform {
            path: path.to_string(),
            name: name.to_string(),
            transform: Mat4::IDENTITY,
            ..Default::default()
        };

        let mut xform_ops = Vec::new();

        while let Some((line_num, line)) = self.next_block_line(start_line)? {
            // Child prims first, since def lines may contain xformOp text
            if line.starts_with("def ") {
                self.lines.push_front((line_num, line));
                if let Some(child) = self.parse_prim(path)? {
                    xform.children.push(child);
                }
                continue;
            }

            if let Some(op) = self.parse_xform_op(&line)? {
                xform_ops.push(op);
                continue;
            }

            if line.contains("material:binding") {
                xform.material_binding = self.parse_rel_target(&line);
            }
        }

        xform.transform = compose_xform_ops(&xform_ops);

        Ok(xform)
    }

    /// Parse Mesh content.
    fn parse_mesh_content(
        &mut self,
        path: &str,
        name: &str,
        start_line: usize,
    ) -> ParseResult<UsdMesh> {
        let mut mesh = UsdMesh {
            path: path.to_string(),
            name: name.to_string(),
            ..Default::default()
        };

        let mut xform_ops = Vec::new();

        while let Some((line_num, line)) = self.next_block_line(start_line)? {
            if line.starts_with("def ") {
                // GeomSubsets and similar children are not imported
                self.lines.push_front((line_num, line));
                self.parse_prim(path)?;
                continue;
            }

            if let Some(op) = self.parse_xform_op(&line)? {
                xform_ops.push(op);
                continue;
            }

            let attribute = attribute_name(&line);

            if attribute == "points" && line.contains("[]") {
                mesh.points = self.parse_vec3_array(&line)?;
            } else if attribute == "faceVertexCounts" {
                mesh.face_vertex_counts = self.parse_int_array(&line)?;
            } else if attribute == "faceVertexIndices" {
                mesh.face_vertex_indices = self.parse_int_array(&line)?;
            } else if attribute == "normals" || attribute == "primvars:normals" {
                mesh.normals = Some(self.parse_vec3_array(&line)?);
            } else if attribute == "primvars:st" && line.contains("[]") {
                mesh.st = Some(self.parse_vec2_array(&line)?);
            } else if attribute == "orientation" {
                if line.contains("\"leftHanded\"") {
                    mesh.left_handed = true;
                    log::debug!("Mesh {} uses left-handed winding", mesh.name);
                }
            } else if attribute == "material:binding" {
                mesh.material_binding = self.parse_rel_target(&line);
            } else if line.contains('[') && !line.contains(']') {
                // Unsupported multi-line array attribute
                self.collect_array(&line)?;
            }
        }

        mesh.transform = compose_xform_ops(&xform_ops);

        Ok(mesh)
    }

    /// Parse Material content: shader children, everything else is ignored.
    fn parse_material_content(
        &mut self,
        path: &str,
        name: &str,
        start_line: usize,
    ) -> ParseResult<UsdMaterial> {
        let mut material = UsdMaterial {
            path: path.to_string(),
            name: name.to_string(),
            shaders: Vec::new(),
        };

        while let Some((line_num, line)) = self.next_block_line(start_line)? {
            if line.starts_with("def ") {
                self.lines.push_front((line_num, line));
                match self.parse_prim(path)? {
                    Some(UsdPrim::Shader(shader)) => material.shaders.push(shader),
                    Some(UsdPrim::Xform(group)) => {
                        // NodeGraph-like grouping via Scope
                        let shaders = group.children.into_iter().filter_map(|c| match c {
                            UsdPrim::Shader(s) => Some(s),
                            _ => None,
                        });
                        material.shaders.extend(shaders);
                    }
                    _ => {}
                }
            }
        }

        Ok(material)
    }

    /// Parse Shader content: `info:id` and `inputs:*`.
    fn parse_shader_content(
        &mut self,
        path: &str,
        name: &str,
        start_line: usize,
    ) -> ParseResult<UsdShader> {
        let mut shader = UsdShader {
            path: path.to_string(),
            name: name.to_string(),
            ..Default::default()
        };

        while let Some((line_num, line)) = self.next_block_line(start_line)? {
            if line.starts_with("def ") {
                self.lines.push_front((line_num, line));
                self.parse_prim(path)?;
                continue;
            }

            if attribute_name(&line) == "info:id" {
                shader.shader_id = quoted(&line).map(str::to_string);
                continue;
            }

            if let Some((input, value)) = self.parse_shader_input(&line)? {
                shader.inputs.push((input, value));
            }
        }

        Ok(shader)
    }

    /// Parse an `inputs:name = value` or `inputs:name.connect = <...>` line.
    fn parse_shader_input(&self, line: &str) -> ParseResult<Option<(String, UsdValue)>> {
        let attribute = attribute_name(line);
        let Some(input) = attribute.strip_prefix("inputs:") else {
            return Ok(None);
        };

        if let Some(input) = input.strip_suffix(".connect") {
            let Some(target) = self.parse_rel_target(line) else {
                return Ok(None);
            };
            // </Mat/Tex.outputs:rgb> -> /Mat/Tex
            let prim = target.split(".outputs").next().unwrap_or(&target).to_string();
            return Ok(Some((input.to_string(), UsdValue::Connection(prim))));
        }

        let Some(eq_pos) = line.find('=') else {
            return Ok(None);
        };
        let value = line[eq_pos + 1..].trim();

        let parsed = if value.starts_with('(') {
            UsdValue::Color(self.parse_inline_vec3(line)?)
        } else if let Some(asset) = value.strip_prefix('@') {
            UsdValue::Asset(asset.trim_end_matches('@').to_string())
        } else if let Some(token) = quoted(value) {
            UsdValue::Token(token.to_string())
        } else {
            UsdValue::Float(self.parse_number(value)?)
        };

        Ok(Some((input.to_string(), parsed)))
    }

    /// Parse a single xformOp attribute.
    fn parse_xform_op(&self, line: &str) -> ParseResult<Option<XformOp>> {
        let attribute = attribute_name(line);
        if !attribute.starts_with("xformOp:") || !line.contains('=') {
            // xformOpOrder only lists the order of ops
            return Ok(None);
        }

        let op = match attribute.trim_start_matches("xformOp:").split(':').next() {
            Some("translate") => XformOp::Translate(self.parse_inline_vec3(line)?),
            Some("rotateXYZ") => XformOp::RotateXYZ(self.parse_inline_vec3(line)?),
            Some("rotateX") => XformOp::RotateX(self.parse_inline_float(line)?),
            Some("rotateY") => XformOp::RotateY(self.parse_inline_float(line)?),
            Some("rotateZ") => XformOp::RotateZ(self.parse_inline_float(line)?),
            Some("scale") => XformOp::Scale(self.parse_inline_vec3(line)?),
            _ => {
                log::debug!("Ignoring unsupported xformOp at line {}: {}", self.current_line, line);
                return Ok(None);
            }
        };

        Ok(Some(op))
    }

    fn parse_number(&self, value: &str) -> ParseResult<f32> {
        value.trim().parse::<f32>().map_err(|_| ParseError::InvalidNumber {
            line: self.current_line,
            value: value.trim().to_string(),
        })
    }

    /// Parse an inline Vec3 value like (1, 2, 3) after the `=`.
    fn parse_inline_vec3(&self, line: &str) -> ParseResult<Vec3> {
        let value = line.split_once('=').map_or(line, |(_, v)| v);
        let tuples = self.parse_tuples(value, 3)?;
        match tuples.as_slice() {
            [v] => Ok(Vec3::new(v[0], v[1], v[2])),
            _ => Err(ParseError::Parse {
                line: self.current_line,
                message: format!("Expected a single (x, y, z) value in: {}", line),
            }),
        }
    }

    /// Parse an inline float value after the `=`.
    fn parse_inline_float(&self, line: &str) -> ParseResult<f32> {
        let (_, value) = line.split_once('=').ok_or_else(|| ParseError::Parse {
            line: self.current_line,
            message: "Expected '='".to_string(),
        })?;
        self.parse_number(value)
    }

    /// Collect the text between `[` and `]`, reading more lines if the
    /// array spans several.
    fn collect_array(&mut self, first_line: &str) -> ParseResult<String> {
        let after_eq = first_line.split_once('=').map_or(first_line, |(_, v)| v);
        let Some(bracket_start) = after_eq.find('[') else {
            return Err(ParseError::Parse {
                line: self.current_line,
                message: format!("Expected '[' in: {}", first_line),
            });
        };

        let mut content = after_eq[bracket_start + 1..].to_string();
        let start_line = self.current_line;
        while !content.contains(']') {
            let (_, line) = self
                .lines
                .pop_front()
                .ok_or(ParseError::UnclosedBlock(start_line))?;
            content.push(' ');
            content.push_str(&line);
        }

        let end = content.find(']').unwrap_or(content.len());
        content.truncate(end);
        Ok(content)
    }

    /// Parse `(a, b, ...)` tuples of exactly `arity` numbers.
    fn parse_tuples(&self, text: &str, arity: usize) -> ParseResult<Vec<Vec<f32>>> {
        let mut result = Vec::new();

        for chunk in text.split('(').skip(1) {
            let inner = chunk.split(')').next().unwrap_or("");
            let values = inner
                .split(',')
                .map(|v| self.parse_number(v))
                .collect::<ParseResult<Vec<f32>>>()?;

            if values.len() != arity {
                return Err(ParseError::Parse {
                    line: self.current_line,
                    message: format!("Expected {} components, got {}", arity, values.len()),
                });
            }
            result.push(values);
        }

        Ok(result)
    }

    /// Parse a Vec3 array like [(1, 2, 3), (4, 5, 6), ...].
    fn parse_vec3_array(&mut self, first_line: &str) -> ParseResult<Vec<Vec3>> {
        let content = self.collect_array(first_line)?;
        Ok(self
            .parse_tuples(&content, 3)?
            .into_iter()
            .map(|v| Vec3::new(v[0], v[1], v[2]))
            .collect())
    }

    /// Parse a Vec2 array like [(0, 0), (1, 0), ...].
    fn parse_vec2_array(&mut self, first_line: &str) -> ParseResult<Vec<Vec2>> {
        let content = self.collect_array(first_line)?;
        Ok(self
            .parse_tuples(&content, 2)?
            .into_iter()
            .map(|v| Vec2::new(v[0], v[1]))
            .collect())
    }

    /// Parse an int array like [1, 2, 3, ...].
    fn parse_int_array(&mut self, first_line: &str) -> ParseResult<Vec<i32>> {
        let content = self.collect_array(first_line)?;
        content
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i32>().map_err(|_| ParseError::InvalidNumber {
                    line: self.current_line,
                    value: s.to_string(),
                })
            })
            .collect()
    }

    /// Target of a relationship or connection: the text between `<` and `>`.
    fn parse_rel_target(&self, line: &str) -> Option<String> {
        let start = line.find('<')?;
        let end = line[start..].find('>')? + start;
        let target = line[start + 1..end].trim();
        (!target.is_empty()).then(|| target.to_string())
    }
}

/// Attribute name of a property line: the word before `=`, without the
/// type and qualifiers (`uniform token info:id = ...` -> `info:id`).
fn attribute_name(line: &str) -> &str {
    let lhs = line.split('=').next().unwrap_or(line);
    lhs.split_whitespace().last().unwrap_or("")
}

/// Content of the first double-quoted string.
fn quoted(text: &str) -> Option<&str> {
    let mut parts = text.splitn(3, '"');
    parts.next()?;
    let inner = parts.next()?;
    parts.next().map(|_| inner)
}

/// Parse a USDA string and return the list of root prims.
pub fn parse_usda(content: &str) -> ParseResult<Vec<UsdPrim>> {
    let mut parser = UsdaParser::new(content);
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_mesh() {
        let usda = r#"#usda 1.0
(
    defaultPrim = "Cube"
    upAxis = "Y"
)

def Mesh "Cube" (
    prepend apiSchemas = ["MaterialBindingAPI"]
)
{
    point3f[] points = [(0, 0, 0), (1, 0, 0),
        (1, 1, 0), (0, 1, 0)]
    int[] faceVertexCounts = [4]
    int[] faceVertexIndices = [0, 1, 2, 3]
    texCoord2f[] primvars:st = [(0, 0), (1, 0), (1, 1), (0, 1)] (
        interpolation = "vertex"
    )
    rel material:binding = </Looks/Red>
}
"#;

        let prims = parse_usda(usda).unwrap();
        assert_eq!(prims.len(), 1);

        let UsdPrim::Mesh(mesh) = &prims[0] else {
            panic!("Expected Mesh prim");
        };
        assert_eq!(mesh.name, "Cube");
        assert_eq!(mesh.path, "/Cube");
        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.face_vertex_counts, vec![4]);
        assert_eq!(mesh.face_vertex_indices, vec![0, 1, 2, 3]);
        assert_eq!(mesh.st.as_ref().map(Vec::len), Some(4));
        assert_eq!(mesh.material_binding.as_deref(), Some("/Looks/Red"));
    }

    #[test]
    fn test_parse_xform_with_ops() {
        let usda = r#"
def Xform "Model" {
    double3 xformOp:translate = (1, 2, 3)
    double3 xformOp:scale = (2, 2, 2)
    uniform token[] xformOpOrder = ["xformOp:translate", "xformOp:scale"]

    def Xform "Child" {}
}
"#;

        let prims = parse_usda(usda).unwrap();
        assert_eq!(prims.len(), 1);

        let UsdPrim::Xform(xform) = &prims[0] else {
            panic!("Expected Xform prim");
        };
        assert_eq!(xform.name, "Model");
        assert_eq!(xform.children.len(), 1);

        let translated = xform.transform.transform_point3(Vec3::ZERO);
        assert!((translated - Vec3::new(1.0, 2.0, 3.0)).length() < 0.001);
    }

    #[test]
    fn test_parse_material_network() {
        let usda = r#"
def Scope "Looks" {
    def Material "Wood" {
        token outputs:surface.connect = </Looks/Wood/Surface.outputs:surface>

        def Shader "Surface" {
            uniform token info:id = "UsdPreviewSurface"
            color3f inputs:diffuseColor.connect = </Looks/Wood/Tex.outputs:rgb>
            float inputs:roughness = 0.75
            color3f inputs:emissiveColor = (0.1, 0.2, 0.3)
        }

        def Shader "Tex" {
            uniform token info:id = "UsdUVTexture"
            asset inputs:file = @textures/wood.png@
            token inputs:wrapS = "clamp"
        }
    }
}
"#;

        let prims = parse_usda(usda).unwrap();
        let UsdPrim::Xform(looks) = &prims[0] else {
            panic!("Expected Scope prim");
        };
        let UsdPrim::Material(material) = &looks.children[0] else {
            panic!("Expected Material prim");
        };

        assert_eq!(material.path, "/Looks/Wood");
        assert_eq!(material.shaders.len(), 2);

        let surface = material.surface().unwrap();
        assert_eq!(surface.name, "Surface");
        assert_eq!(surface.input("roughness"), Some(&UsdValue::Float(0.75)));
        assert_eq!(
            surface.input("diffuseColor"),
            Some(&UsdValue::Connection("/Looks/Wood/Tex".to_string()))
        );

        let tex = material.shader("/Looks/Wood/Tex").unwrap();
        assert_eq!(tex.input("file"), Some(&UsdValue::Asset("textures/wood.png".to_string())));
        assert_eq!(tex.input("wrapS"), Some(&UsdValue::Token("clamp".to_string())));
    }

    #[test]
    fn test_unknown_prims_are_skipped() {
        let usda = r#"
def Camera "Cam" {
    float focalLength = 50
    def Scope "Nested" {
    }
}
def Xform "After" {
}
"#;

        let prims = parse_usda(usda).unwrap();
        assert_eq!(prims.len(), 2);
        assert!(matches!(&prims[0], UsdPrim::Unknown(t) if t == "Camera"));
        assert!(matches!(&prims[1], UsdPrim::Xform(x) if x.name == "After"));
    }

    #[test]
    fn test_errors() {
        let unclosed =
            parse_usda("def Xform \"Open\" {\n    double3 xformOp:translate = (1, 2, 3)\n");
        assert!(matches!(unclosed, Err(ParseError::UnclosedBlock(1))));

        let bad_number = parse_usda("def Mesh \"M\" {\n    int[] faceVertexCounts = [3, x]\n}\n");
        assert!(matches!(bad_number, Err(ParseError::InvalidNumber { line: 2, .. })));
    }
}
