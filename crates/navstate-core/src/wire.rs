//! Byte form of [`NavigationalState`].
//!
//! Field order is fixed: render path, action window, resource window,
//! cacheability, resource id, then the public-current, public-pending,
//! private-render, window-state, portlet-mode and parameter maps.

use navstate_codec::{CodecError, ElementCodec, Reader, Writer};

use crate::state::{NavigationalState, ParameterMap, Values};
use crate::window::{Parameter, PortletMode, WindowState};

const VALUES: ElementCodec<Values> = ElementCodec::new(
    |out, values| out.write_str_array(Some(values.iter().map(Option::as_deref))),
    |input| {
        input
            .read_str_array()?
            .ok_or(CodecError::UnexpectedNull("parameter values"))
    },
);

const WINDOW_STATE: ElementCodec<WindowState> = ElementCodec::new(
    |out, state| out.write_str(Some(state.as_str())),
    |input| Ok(WindowState::new(input.read_required_str("window state")?)),
);

const PORTLET_MODE: ElementCodec<PortletMode> = ElementCodec::new(
    |out, mode| out.write_str(Some(mode.as_str())),
    |input| Ok(PortletMode::new(input.read_required_str("portlet mode")?)),
);

/// Name, values, then window id.
const PARAMETER: ElementCodec<Parameter> = ElementCodec::new(
    |out, param| {
        out.write_str(Some(&param.name));
        out.write_str_array(Some(param.values.iter().map(|v| Some(v.as_str()))));
        out.write_str(Some(&param.window_id));
    },
    |input| {
        let name = input.read_required_str("parameter name")?.to_owned();
        let values = input
            .read_str_array()?
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.ok_or(CodecError::UnexpectedNull("parameter value")))
            .collect::<Result<Vec<_>, _>>()?;
        let window_id = input.read_required_str("parameter window")?.to_owned();
        Ok(Parameter {
            window_id,
            name,
            values,
        })
    },
);

impl NavigationalState {
    /// Serializes the persisted fields. The request binding is not written.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Writer::with_capacity(256);
        out.write_str(self.render_path.as_deref());
        out.write_str(self.action_window.as_deref());
        out.write_str(self.resource_window.as_deref());
        out.write_str(self.cacheability.as_deref());
        out.write_str(self.resource_id.as_deref());
        VALUES.write_map(&mut out, Some(self.public_current.iter()));
        VALUES.write_map(&mut out, Some(self.public_pending.iter()));
        VALUES.write_map(&mut out, Some(self.private_render.iter()));
        WINDOW_STATE.write_map(&mut out, Some(self.window_states.iter()));
        PORTLET_MODE.write_map(&mut out, Some(self.portlet_modes.iter()));
        PARAMETER.write_map(
            &mut out,
            Some(self.parameters.iter().map(|(key, param)| (key.wire_key(), param))),
        );
        out.into_bytes()
    }

    /// Inverse of [`NavigationalState::encode`]. An absent map decodes as
    /// empty. Parameter map keys are rebuilt from each parameter's own window
    /// and name; the concatenated wire key is not trusted.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut input = Reader::from_bytes(bytes)?;
        let owned = |input: &mut Reader<'_>| -> Result<Option<String>, CodecError> {
            Ok(input.read_str()?.map(str::to_owned))
        };

        let render_path = owned(&mut input)?;
        let action_window = owned(&mut input)?;
        let resource_window = owned(&mut input)?;
        let cacheability = owned(&mut input)?;
        let resource_id = owned(&mut input)?;
        let public_current: ParameterMap = VALUES.read_map(&mut input)?.unwrap_or_default();
        let public_pending: ParameterMap = VALUES.read_map(&mut input)?.unwrap_or_default();
        let private_render: ParameterMap = VALUES.read_map(&mut input)?.unwrap_or_default();
        let window_states = WINDOW_STATE.read_map(&mut input)?.unwrap_or_default();
        let portlet_modes = PORTLET_MODE.read_map(&mut input)?.unwrap_or_default();
        let parameters = PARAMETER
            .read_map::<Vec<_>>(&mut input)?
            .unwrap_or_default()
            .into_iter()
            .map(|(_, param)| (param.key(), param))
            .collect();

        Ok(Self {
            render_path,
            action_window,
            resource_window,
            cacheability,
            resource_id,
            public_current: public_current.into(),
            public_pending,
            private_render,
            window_states,
            portlet_modes,
            parameters,
            ..Self::default()
        })
    }
}
